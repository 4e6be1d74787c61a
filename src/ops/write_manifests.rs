//! Persisting the header and source manifests.

use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::ops::errors::RegenError;
use crate::util::fs::write_atomic;

/// Writes the two manifests to fixed destinations.
///
/// Each file is replaced atomically. Headers are written first; if the
/// sources write then fails, the new headers manifest stays in place and
/// the error is returned.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    headers_path: PathBuf,
    sources_path: PathBuf,
}

impl ManifestWriter {
    pub fn new(headers_path: impl Into<PathBuf>, sources_path: impl Into<PathBuf>) -> Self {
        ManifestWriter {
            headers_path: headers_path.into(),
            sources_path: sources_path.into(),
        }
    }

    pub fn headers_path(&self) -> &Path {
        &self.headers_path
    }

    pub fn sources_path(&self) -> &Path {
        &self.sources_path
    }

    /// Write both manifests in resolver order.
    pub fn write(&self, headers: &Manifest, sources: &Manifest) -> Result<(), RegenError> {
        write_one(&self.headers_path, headers)?;
        write_one(&self.sources_path, sources)?;
        Ok(())
    }
}

fn write_one(path: &Path, manifest: &Manifest) -> Result<(), RegenError> {
    write_atomic(path, manifest.render().as_bytes()).map_err(|e| RegenError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        "wrote {} {} paths to {}",
        manifest.len(),
        manifest.kind(),
        path.display()
    );
    Ok(())
}
