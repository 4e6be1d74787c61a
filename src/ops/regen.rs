//! Implementation of `embedlist regen`.
//!
//! One-shot pipeline: load the supplemental symbols, build the runtime in
//! an isolated workspace, resolve the artifact set from the build output,
//! and write the two manifests. A run either writes both manifests or
//! reports why it did not.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::presym::SymbolSetBuilder;
use crate::builder::runner::{BuildConfiguration, BuildSettings, IsolatedBuildRunner};
use crate::core::layout::BuildLayout;
use crate::core::symbol::SymbolPolicy;
use crate::ops::errors::RegenError;
use crate::ops::write_manifests::ManifestWriter;
use crate::resolver::{ArtifactSetResolver, ResolvedArtifacts};
use crate::util::interrupt::Interrupt;

/// Options for a regeneration run.
#[derive(Debug, Clone)]
pub struct RegenOptions {
    /// Build configuration wiring in the symbol augmenter
    pub build_config: PathBuf,

    /// Runtime source checkout
    pub runtime: PathBuf,

    /// Supplemental symbol file
    pub presym: PathBuf,

    /// Destination of the headers manifest
    pub headers: PathBuf,

    /// Destination of the sources manifest
    pub sources: PathBuf,

    /// External build tool settings
    pub build: BuildSettings,

    /// Build-output layout contract
    pub layout: BuildLayout,

    /// Admission policy for supplemental symbols
    pub policy: SymbolPolicy,

    /// Parent directory for the workspace (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RegenReport {
    pub supplemental_symbols: usize,
    pub features: Vec<String>,
    pub skipped_features: Vec<String>,
    pub headers: usize,
    pub sources: usize,
    pub headers_path: PathBuf,
    pub sources_path: PathBuf,
}

/// Run the full pipeline.
pub fn regenerate(opts: &RegenOptions, interrupt: &Interrupt) -> Result<RegenReport, RegenError> {
    // Validated before anything touches the filesystem.
    let augmenter = SymbolSetBuilder::from_file(&opts.presym, opts.policy)?;
    let supplemental_symbols = augmenter.supplemental().len();
    let configuration = BuildConfiguration::new(&opts.build_config, augmenter);

    let mut runner = IsolatedBuildRunner::new(&opts.runtime, opts.build.clone())
        .with_interrupt(interrupt.clone());
    if let Some(ref dir) = opts.scratch_dir {
        runner = runner.with_scratch_dir(dir);
    }

    let resolver = ArtifactSetResolver::new(&opts.layout);
    let artifacts = runner.run(&configuration, &opts.layout, |tree| resolver.resolve(tree))?;

    persist(opts, &artifacts, interrupt)?;

    tracing::debug!(
        "identified {} header files and {} source files",
        artifacts.headers.len(),
        artifacts.sources.len()
    );

    Ok(RegenReport {
        supplemental_symbols,
        headers: artifacts.headers.len(),
        sources: artifacts.sources.len(),
        features: display_names(&artifacts.features),
        skipped_features: display_names(&artifacts.skipped_features),
        headers_path: opts.headers.clone(),
        sources_path: opts.sources.clone(),
    })
}

/// Write both manifests unless the run was interrupted first.
fn persist(
    opts: &RegenOptions,
    artifacts: &ResolvedArtifacts,
    interrupt: &Interrupt,
) -> Result<(), RegenError> {
    if interrupt.is_triggered() {
        return Err(RegenError::Interrupted {
            stage: "manifest write".to_string(),
        });
    }
    let writer = ManifestWriter::new(&opts.headers, &opts.sources);
    writer.write(&artifacts.headers, &artifacts.sources)
}

fn display_names(names: &[OsString]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}
