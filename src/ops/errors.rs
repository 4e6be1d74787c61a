//! Pipeline error types and diagnostics.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::builder::runner::BuildStep;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Captured output is trimmed to this many trailing lines in diagnostics.
const OUTPUT_TAIL_LINES: usize = 40;

/// Error during a manifest regeneration run.
///
/// Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum RegenError {
    #[error("cannot find {what}: {}", .path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error(
        "inputs {} and {} would both be staged as `{name}`",
        .first.display(),
        .second.display()
    )]
    InputConflict {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("build step `{step}` failed with exit code {}", display_status(.status))]
    ExternalBuild {
        step: BuildStep,
        status: Option<i32>,
        output: String,
    },

    #[error("build step `{step}` timed out after {}s (retried once)", .after.as_secs())]
    BuildTimeout { step: BuildStep, after: Duration },

    #[error("interrupted during {stage}")]
    Interrupted { stage: String },

    #[error("failed to run build tool `{}`", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("build output is missing expected directory: {}", .path.display())]
    Integrity { path: PathBuf },

    #[error("path escapes the workspace: {}", .path.display())]
    PathEscape { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write manifest: {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to prepare build workspace: {message}")]
    Workspace {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid symbol on line {line} of {}: `{entry}`", .path.display())]
    InvalidSymbol {
        path: PathBuf,
        line: usize,
        entry: String,
    },
}

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

/// Broad error category, used for exit codes and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    ExternalBuild,
    Integrity,
    Write,
    Other,
}

impl ErrorKind {
    /// Process exit code for this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::MissingInput => 2,
            ErrorKind::ExternalBuild => 3,
            ErrorKind::Integrity => 4,
            ErrorKind::Write => 5,
            ErrorKind::Other => 1,
        }
    }
}

impl RegenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegenError::MissingInput { .. } | RegenError::InvalidSymbol { .. } => {
                ErrorKind::MissingInput
            }
            RegenError::ExternalBuild { .. }
            | RegenError::BuildTimeout { .. }
            | RegenError::Interrupted { .. }
            | RegenError::Spawn { .. } => ErrorKind::ExternalBuild,
            RegenError::Integrity { .. }
            | RegenError::PathEscape { .. }
            | RegenError::Read { .. } => ErrorKind::Integrity,
            RegenError::Write { .. } => ErrorKind::Write,
            RegenError::Workspace { .. } | RegenError::InputConflict { .. } => ErrorKind::Other,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            RegenError::MissingInput { path, .. } => diag
                .with_location(path)
                .with_suggestion(suggestions::CHECK_INPUTS),

            RegenError::InputConflict { .. } => diag.with_suggestion(suggestions::DISTINCT_INPUTS),

            RegenError::ExternalBuild { output, .. } => {
                let mut diag = diag;
                let lines: Vec<&str> = output.lines().collect();
                let skip = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
                if skip > 0 {
                    diag = diag.with_context(format!("... {} earlier lines omitted", skip));
                }
                for line in &lines[skip..] {
                    diag = diag.with_context(*line);
                }
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }

            RegenError::BuildTimeout { .. } => diag.with_suggestion(suggestions::BUILD_TIMEOUT),

            RegenError::Spawn { source, .. } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::BUILD_TOOL),

            RegenError::Integrity { .. } | RegenError::PathEscape { .. } => {
                diag.with_suggestion(suggestions::LAYOUT_MISMATCH)
            }

            RegenError::Read { source, .. }
            | RegenError::Write { source, .. }
            | RegenError::Workspace { source, .. } => diag.with_context(source.to_string()),

            RegenError::InvalidSymbol { path, .. } => diag
                .with_location(path)
                .with_suggestion(suggestions::SYMBOL_POLICY),

            RegenError::Interrupted { .. } => diag,
        }
    }
}
