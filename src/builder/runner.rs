//! Isolated runtime builds.
//!
//! The runner stages its inputs into a fresh [`Workspace`], runs the
//! external build tool's clean and build steps against the staged copy,
//! and hands the resulting build-output tree to a consumer while the
//! workspace is still alive. The caller's checkout is never written to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder::presym::{SymbolAugmenter, BIN_ENV, PRESYM_ENV};
use crate::builder::workspace::{BuildInputs, Workspace};
use crate::core::layout::BuildLayout;
use crate::ops::errors::RegenError;
use crate::util::interrupt::Interrupt;
use crate::util::process::{find_executable, Outcome, ProcessBuilder};

/// One invocation of the external build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Clean,
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::Clean => write!(f, "clean"),
            BuildStep::Build => write!(f, "build"),
        }
    }
}

/// How to drive the external build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Build tool executable (name on PATH or a path)
    pub tool: String,
    /// Arguments placed before the target, e.g. `["exec", "rake"]` for bundler
    pub tool_args: Vec<String>,
    /// Target that wipes previous build output
    pub clean_target: String,
    /// Target that builds everything
    pub build_target: String,
    /// Environment variable the tool reads the configuration path from
    pub config_env: String,
    /// Per-step timeout; `None` waits forever
    pub timeout: Option<Duration>,
    /// Retry the clean+build sequence once after a timeout
    pub retry_on_timeout: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            tool: "rake".to_string(),
            tool_args: Vec::new(),
            clean_target: "deep_clean".to_string(),
            build_target: "all".to_string(),
            config_env: "MRUBY_CONFIG".to_string(),
            timeout: None,
            retry_on_timeout: true,
        }
    }
}

/// A build configuration file composed with the symbol augmenter it wires
/// into the build's symbol scan.
///
/// The external build reaches the augmenter through `embedlist presym`,
/// which rebuilds it from the staged [`SymbolAugmenter::source_file`].
pub struct BuildConfiguration {
    path: PathBuf,
    augmenter: Box<dyn SymbolAugmenter>,
}

impl BuildConfiguration {
    pub fn new(path: impl Into<PathBuf>, augmenter: impl SymbolAugmenter + 'static) -> Self {
        BuildConfiguration {
            path: path.into(),
            augmenter: Box::new(augmenter),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn augmenter(&self) -> &dyn SymbolAugmenter {
        self.augmenter.as_ref()
    }
}

impl fmt::Debug for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfiguration")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The build output of a successful run, inside the live workspace.
#[derive(Debug)]
pub struct BuildOutputTree<'a> {
    workspace_root: &'a Path,
    runtime_root: &'a Path,
    build_root: PathBuf,
}

impl<'a> BuildOutputTree<'a> {
    pub fn new(workspace_root: &'a Path, runtime_root: &'a Path, layout: &BuildLayout) -> Self {
        BuildOutputTree {
            workspace_root,
            runtime_root,
            build_root: runtime_root.join(&layout.build_dir),
        }
    }

    /// Root every returned path is made relative to.
    pub fn workspace_root(&self) -> &Path {
        self.workspace_root
    }

    /// The staged runtime checkout the build ran in.
    pub fn runtime_root(&self) -> &Path {
        self.runtime_root
    }

    /// Root of the generated build output.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }
}

/// Result of a single supervised step.
enum StepResult {
    Done,
    TimedOut,
}

fn interrupted_step(step: BuildStep) -> RegenError {
    RegenError::Interrupted {
        stage: format!("build step `{}`", step),
    }
}

/// Runs clean + build of the runtime in a disposable workspace.
#[derive(Debug)]
pub struct IsolatedBuildRunner {
    runtime: PathBuf,
    settings: BuildSettings,
    scratch_dir: Option<PathBuf>,
    interrupt: Interrupt,
}

impl IsolatedBuildRunner {
    pub fn new(runtime: impl Into<PathBuf>, settings: BuildSettings) -> Self {
        IsolatedBuildRunner {
            runtime: runtime.into(),
            settings,
            scratch_dir: None,
            interrupt: Interrupt::new(),
        }
    }

    /// Create workspaces under `dir` instead of the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Stop the running step when `interrupt` fires.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Build in a fresh workspace and pass the output tree to `consume`.
    ///
    /// `consume` only runs if both steps succeed. The workspace is removed
    /// before this returns, whatever the outcome.
    pub fn run<T, F>(
        &self,
        configuration: &BuildConfiguration,
        layout: &BuildLayout,
        consume: F,
    ) -> Result<T, RegenError>
    where
        F: FnOnce(&BuildOutputTree<'_>) -> Result<T, RegenError>,
    {
        let inputs = BuildInputs {
            build_config: configuration.path().to_path_buf(),
            runtime: self.runtime.clone(),
            presym: configuration.augmenter().source_file().to_path_buf(),
        };
        inputs.check()?;

        let tool = find_executable(&self.settings.tool).ok_or_else(|| RegenError::MissingInput {
            what: "build tool",
            path: PathBuf::from(&self.settings.tool),
        })?;

        let workspace = Workspace::create(&inputs, self.scratch_dir.as_deref())?;
        tracing::debug!("building runtime in {}", workspace.root().display());

        self.clean_and_build(&tool, &workspace)?;
        self.check_interrupt("artifact resolution")?;

        let tree = BuildOutputTree::new(workspace.root(), workspace.runtime(), layout);
        let value = consume(&tree)?;
        self.check_interrupt("artifact resolution")?;
        Ok(value)
    }

    /// Ctrl-C between external steps is only noticed here.
    fn check_interrupt(&self, stage: &str) -> Result<(), RegenError> {
        if self.interrupt.is_triggered() {
            return Err(RegenError::Interrupted {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }

    fn command(&self, tool: &Path, workspace: &Workspace, target: &str) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(tool)
            .args(&self.settings.tool_args)
            .arg(target)
            .env(&self.settings.config_env, workspace.build_config())
            .env(PRESYM_ENV, workspace.presym())
            .cwd(workspace.runtime());

        if let Ok(exe) = std::env::current_exe() {
            cmd = cmd.env(BIN_ENV, exe);
        }
        cmd
    }

    fn clean_and_build(&self, tool: &Path, workspace: &Workspace) -> Result<(), RegenError> {
        let attempts = if self.settings.retry_on_timeout { 2 } else { 1 };

        for attempt in 1..=attempts {
            let last = attempt == attempts;

            for (step, target) in [
                (BuildStep::Clean, &self.settings.clean_target),
                (BuildStep::Build, &self.settings.build_target),
            ] {
                let cmd = self.command(tool, workspace, target);
                match self.run_step(step, &cmd)? {
                    StepResult::Done => {}
                    StepResult::TimedOut if last => {
                        return Err(RegenError::BuildTimeout {
                            step,
                            after: self.settings.timeout.unwrap_or_default(),
                        });
                    }
                    StepResult::TimedOut => {
                        tracing::warn!("build step `{}` timed out, retrying once", step);
                        break;
                    }
                }

                if step == BuildStep::Build {
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn run_step(&self, step: BuildStep, cmd: &ProcessBuilder) -> Result<StepResult, RegenError> {
        tracing::debug!("running `{}`", cmd.display_command());

        let outcome = cmd
            .exec_supervised(self.settings.timeout, &self.interrupt)
            .map_err(|e| RegenError::Spawn {
                program: cmd.get_program().to_path_buf(),
                source: e,
            })?;

        match outcome {
            Outcome::Finished(captured) => {
                // a child killed by Ctrl-C exits on its own; report the interrupt
                if self.interrupt.is_triggered() {
                    return Err(interrupted_step(step));
                }
                if !captured.status.success() {
                    return Err(RegenError::ExternalBuild {
                        step,
                        status: captured.status.code(),
                        output: captured.combined(),
                    });
                }
                tracing::debug!("build step `{}` finished", step);
                Ok(StepResult::Done)
            }
            Outcome::TimedOut => Ok(StepResult::TimedOut),
            Outcome::Interrupted => Err(interrupted_step(step)),
        }
    }
}
