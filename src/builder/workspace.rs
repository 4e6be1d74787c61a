//! Ephemeral build workspace.
//!
//! A [`Workspace`] is a private temporary directory holding copies of the
//! build configuration, the runtime checkout and the supplemental symbol
//! file. It is deleted when dropped, on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::ops::errors::RegenError;
use crate::util::fs::copy_dir_all;

/// Prefix for workspace directory names under the system temp dir.
pub const WORKSPACE_PREFIX: &str = "embedlist-";

/// The three inputs staged into every workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInputs {
    /// Build configuration that wires in the symbol augmenter
    pub build_config: PathBuf,
    /// Runtime source checkout
    pub runtime: PathBuf,
    /// Supplemental symbol file
    pub presym: PathBuf,
}

impl BuildInputs {
    /// Fail with `MissingInput` unless every input exists.
    pub fn check(&self) -> Result<(), RegenError> {
        let inputs = [
            ("build configuration", &self.build_config),
            ("runtime checkout", &self.runtime),
            ("supplemental symbol file", &self.presym),
        ];
        for (what, path) in inputs {
            if !path.exists() {
                return Err(RegenError::MissingInput {
                    what,
                    path: path.clone(),
                });
            }
        }
        if !self.runtime.is_dir() {
            return Err(RegenError::MissingInput {
                what: "runtime checkout directory",
                path: self.runtime.clone(),
            });
        }
        self.check_distinct_names()
    }

    /// Inputs are staged side by side under their own file names, so no two
    /// may share one.
    pub fn check_distinct_names(&self) -> Result<(), RegenError> {
        let staged = [&self.build_config, &self.runtime, &self.presym];
        for (i, first) in staged.iter().enumerate() {
            for second in &staged[i + 1..] {
                let name = staged_name(first)?;
                if name == staged_name(second)? {
                    return Err(RegenError::InputConflict {
                        name: name.to_string_lossy().into_owned(),
                        first: first.to_path_buf(),
                        second: second.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A populated, disposable workspace.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    build_config: PathBuf,
    runtime: PathBuf,
    presym: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `parent` (or the system temp dir) and
    /// copy the inputs into it verbatim, keeping their file names.
    ///
    /// Inputs whose file names collide are rejected before anything is
    /// created.
    ///
    /// If population fails the partially filled directory is removed
    /// before the error is returned.
    pub fn create(inputs: &BuildInputs, parent: Option<&Path>) -> Result<Self, RegenError> {
        inputs.check_distinct_names()?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| RegenError::Workspace {
            message: "failed to create temporary directory".to_string(),
            source: e,
        })?;

        tracing::debug!("created workspace {}", dir.path().display());

        let build_config = stage_file(dir.path(), &inputs.build_config)?;
        let runtime = stage_dir(dir.path(), &inputs.runtime)?;
        let presym = stage_file(dir.path(), &inputs.presym)?;

        Ok(Workspace {
            dir,
            build_config,
            runtime,
            presym,
        })
    }

    /// Workspace root; every manifest path is relative to this.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Staged copy of the build configuration.
    pub fn build_config(&self) -> &Path {
        &self.build_config
    }

    /// Staged copy of the runtime checkout.
    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    /// Staged copy of the supplemental symbol file.
    pub fn presym(&self) -> &Path {
        &self.presym
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        tracing::debug!("removing workspace {}", self.dir.path().display());
    }
}

fn staged_name(src: &Path) -> Result<&std::ffi::OsStr, RegenError> {
    src.file_name().ok_or_else(|| RegenError::MissingInput {
        what: "input with a file name",
        path: src.to_path_buf(),
    })
}

fn stage_file(root: &Path, src: &Path) -> Result<PathBuf, RegenError> {
    let dst = root.join(staged_name(src)?);
    fs::copy(src, &dst).map_err(|e| RegenError::Workspace {
        message: format!("failed to copy {}", src.display()),
        source: e,
    })?;
    Ok(dst)
}

fn stage_dir(root: &Path, src: &Path) -> Result<PathBuf, RegenError> {
    let dst = root.join(staged_name(src)?);
    copy_dir_all(src, &dst).map_err(|e| RegenError::Workspace {
        message: format!("failed to copy {}", src.display()),
        source: e,
    })?;
    Ok(dst)
}
