//! The build-output layout contract.
//!
//! Feature-module discovery depends entirely on where the external build
//! puts things. That knowledge lives here, versioned, instead of being
//! scattered through the resolver.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::source_file::SourceKind;

/// The only layout version this build understands.
pub const LAYOUT_VERSION: u32 = 1;

/// Where the external build places its outputs, relative to the runtime
/// checkout root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildLayout {
    /// Layout contract version
    pub version: u32,

    /// Root of the build-output tree
    pub build_dir: PathBuf,

    /// Directory whose subdirectories are the compiled feature modules
    pub feature_output: PathBuf,

    /// Directory holding one source directory per feature module
    pub feature_sources: PathBuf,

    /// Source directories that are always part of the runtime
    pub baseline_dirs: Vec<PathBuf>,

    /// Extensions (without dot) classified as headers
    pub header_extensions: Vec<String>,

    /// Extensions (without dot) classified as sources
    pub source_extensions: Vec<String>,
}

impl Default for BuildLayout {
    fn default() -> Self {
        BuildLayout {
            version: LAYOUT_VERSION,
            build_dir: PathBuf::from("build"),
            feature_output: PathBuf::from("build/host/mrbgems"),
            feature_sources: PathBuf::from("mrbgems"),
            baseline_dirs: vec![
                PathBuf::from("src"),
                PathBuf::from("build/host/mrblib"),
                PathBuf::from("build/host/mrbgems"),
            ],
            header_extensions: ["h", "hh", "hpp", "hxx"].map(String::from).to_vec(),
            source_extensions: ["c", "cc", "cpp", "cxx"].map(String::from).to_vec(),
        }
    }
}

impl BuildLayout {
    /// Check the contract version and that every path stays relative.
    pub fn validate(&self) -> Result<(), String> {
        if self.version != LAYOUT_VERSION {
            return Err(format!(
                "unsupported build layout version {} (this build understands version {})",
                self.version, LAYOUT_VERSION
            ));
        }

        let paths = [&self.build_dir, &self.feature_output, &self.feature_sources]
            .into_iter()
            .chain(self.baseline_dirs.iter());
        for path in paths {
            if path.is_absolute() {
                return Err(format!(
                    "layout path `{}` must be relative to the runtime checkout",
                    path.display()
                ));
            }
        }

        Ok(())
    }

    /// Classify a file by its extension.
    pub fn classify(&self, path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?;
        if self.header_extensions.iter().any(|e| e == ext) {
            Some(SourceKind::Header)
        } else if self.source_extensions.iter().any(|e| e == ext) {
            Some(SourceKind::Source)
        } else {
            None
        }
    }
}
