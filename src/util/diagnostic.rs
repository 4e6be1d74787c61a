//! Error reports for the operator.
//!
//! A fatal error is printed with its root cause, the lines that explain it
//! (such as the tail of a failing build step's output) and what to try next.

use std::fmt;
use std::path::PathBuf;

/// Hints attached to pipeline errors.
pub mod suggestions {
    pub const CHECK_INPUTS: &str =
        "Check the paths under [inputs] in embedlist.toml or pass --build-config/--runtime/--presym";

    pub const DISTINCT_INPUTS: &str =
        "Give the build configuration, runtime checkout and symbol file distinct file names";

    pub const BUILD_FAILED: &str =
        "Fix the build failure above; re-running without a change will fail the same way";

    pub const BUILD_TIMEOUT: &str = "Raise [build] timeout_secs or pass --timeout 0 to disable it";

    pub const BUILD_TOOL: &str = "Install the build tool or set [build] tool in embedlist.toml";

    pub const LAYOUT_MISMATCH: &str =
        "The runtime's build layout may have changed; update the [layout] section";

    pub const SYMBOL_POLICY: &str =
        "Remove the entry or set [symbols] policy = \"verbatim\" to accept raw bytes";
}

/// An error report: message, optional file, detail lines and hints.
#[derive(Debug, Clone, Default)]
pub struct Diagnostic {
    message: String,
    location: Option<PathBuf>,
    context: Vec<String>,
    suggestions: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..Diagnostic::default()
        }
    }

    pub fn with_context(mut self, line: impl Into<String>) -> Self {
        self.context.push(line.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, with ANSI colors if `color` is set.
    pub fn format(&self, color: bool) -> String {
        let (error, help) = if color {
            ("\x1b[1;31merror\x1b[0m", "\x1b[1;32mhelp\x1b[0m")
        } else {
            ("error", "help")
        };

        let mut out = format!("{}: {}\n", error, self.message);
        if let Some(ref path) = self.location {
            out.push_str(&format!("  --> {}\n", path.display()));
        }
        for line in &self.context {
            out.push_str(&format!("  | {}\n", line));
        }
        if !self.suggestions.is_empty() {
            out.push_str(&format!("\n{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
