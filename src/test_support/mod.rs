//! Test utilities for embedlist unit tests.
//!
//! Provides a fake external build tool: a small shell script that behaves
//! like the runtime's clean/build targets and records how it was invoked.

pub mod fixtures;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use fixtures::*;

use crate::builder::runner::BuildSettings;

/// How the fake tool's build target behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// Produce the fixture build output.
    Succeed,
    /// Print a compiler error and exit 7.
    FailBuild,
    /// Never finish.
    Hang,
    /// Hang on the first build, succeed on the next.
    HangOnce,
}

/// A shell-script stand-in for the runtime's build tool.
#[derive(Debug, Clone)]
pub struct FakeTool {
    script: PathBuf,
    log: PathBuf,
}

impl FakeTool {
    /// Write the script into `dir`.
    pub fn write(dir: &Path, mode: ToolMode) -> Self {
        let script = dir.join("fake-build-tool.sh");
        let log = dir.join("fake-build-tool.log");
        let marker = dir.join("fake-build-tool.hung");

        let mut produce = String::new();
        for (path, contents) in BUILD_OUTPUT_FILES {
            let _ = writeln!(produce, "    mkdir -p \"$(dirname '{path}')\"");
            let _ = writeln!(produce, "    printf '%s' '{contents}' > '{path}'");
        }
        produce.push_str("    cp \"$EMBEDLIST_PRESYM\" build/host/presym.txt\n");

        let build = match mode {
            ToolMode::Succeed => produce,
            ToolMode::FailBuild => "    echo 'compiling src/vm.c'\n    \
                 echo 'src/vm.c:12: error: boom' >&2\n    \
                 exit 7\n"
                .to_string(),
            ToolMode::Hang => "    exec sleep 30\n".to_string(),
            ToolMode::HangOnce => format!(
                "    if [ ! -f '{marker}' ]; then\n      \
                 touch '{marker}'\n      \
                 exec sleep 30\n    \
                 fi\n{produce}",
                marker = marker.display(),
                produce = produce
            ),
        };

        let body = format!(
            r#"set -e
echo "$1 $MRUBY_CONFIG" >> '{log}'
case "$1" in
  deep_clean)
    rm -rf build
    ;;
  all)
    test -f "$MRUBY_CONFIG"
    test -f "$EMBEDLIST_PRESYM"
{build}    ;;
  *)
    echo "unknown target $1" >&2
    exit 2
    ;;
esac
"#,
            log = log.display(),
            build = build
        );
        fs::write(&script, body).unwrap();

        FakeTool { script, log }
    }

    /// Settings that run this script through `sh`.
    pub fn settings(&self) -> BuildSettings {
        BuildSettings {
            tool: "sh".to_string(),
            tool_args: vec![self.script.display().to_string()],
            ..BuildSettings::default()
        }
    }

    /// Settings with a per-step timeout.
    pub fn settings_with_timeout(&self, timeout: Duration) -> BuildSettings {
        BuildSettings {
            timeout: Some(timeout),
            ..self.settings()
        }
    }

    /// Targets the script was invoked with, in order.
    pub fn targets(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|(target, _)| target)
            .collect()
    }

    /// (target, configuration path) per invocation.
    pub fn invocations(&self) -> Vec<(String, PathBuf)> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(|line| {
                let (target, config) = line.split_once(' ').unwrap_or((line, ""));
                (target.to_string(), PathBuf::from(config))
            })
            .collect()
    }
}
