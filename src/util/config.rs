//! Configuration file support for embedlist.
//!
//! Settings come from three layers, highest precedence first:
//! 1. Command-line flags
//! 2. `embedlist.toml` (current directory, or `--config <path>`)
//! 3. Built-in defaults
//!
//! Relative paths in the file resolve against the file's own directory,
//! relative paths on the command line against the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::runner::BuildSettings;
use crate::core::layout::BuildLayout;
use crate::core::symbol::SymbolPolicy;
use crate::ops::regen::RegenOptions;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "embedlist.toml";

/// Default build configuration file name.
pub const DEFAULT_BUILD_CONFIG: &str = "mruby-config.rb";

/// Default runtime checkout directory name.
pub const DEFAULT_RUNTIME: &str = "mruby";

/// Default supplemental symbol file name.
pub const DEFAULT_PRESYM: &str = "mruby-presym.txt";

/// Default headers manifest name.
pub const DEFAULT_HEADERS: &str = "mruby-headers.txt";

/// Default sources manifest name.
pub const DEFAULT_SOURCES: &str = "mruby-sources.txt";

/// embedlist configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline inputs
    pub inputs: InputsConfig,

    /// Manifest destinations
    pub outputs: OutputsConfig,

    /// External build tool settings
    pub build: BuildConfig,

    /// Build-output layout contract
    pub layout: BuildLayout,

    /// Supplemental symbol handling
    pub symbols: SymbolsConfig,
}

/// Input paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    /// Build configuration file (e.g. mruby-config.rb)
    pub build_config: Option<PathBuf>,

    /// Runtime source checkout
    pub runtime: Option<PathBuf>,

    /// Supplemental symbol file
    pub presym: Option<PathBuf>,
}

/// Output paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    /// Headers manifest
    pub headers: Option<PathBuf>,

    /// Sources manifest
    pub sources: Option<PathBuf>,
}

/// Build tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build tool executable (default: rake)
    pub tool: Option<String>,

    /// Arguments placed before the target
    pub tool_args: Option<Vec<String>>,

    /// Clean target (default: deep_clean)
    pub clean_target: Option<String>,

    /// Build target (default: all)
    pub build_target: Option<String>,

    /// Environment variable carrying the configuration path (default: MRUBY_CONFIG)
    pub config_env: Option<String>,

    /// Per-step timeout in seconds; 0 or unset disables it
    pub timeout_secs: Option<u64>,

    /// Retry once after a timeout (default: true)
    pub retry_on_timeout: Option<bool>,

    /// Where to create the build workspace (default: system temp dir)
    pub scratch_dir: Option<PathBuf>,
}

/// Symbol configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// Admission policy for supplemental symbols
    pub policy: Option<SymbolPolicy>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Err(msg) = config.layout.validate() {
            bail!("invalid [layout] in {}: {}", path.display(), msg);
        }

        let base = path.parent().unwrap_or(Path::new("."));
        config.rebase(base);
        Ok(config)
    }

    /// Load an explicit config file, or `embedlist.toml` in `cwd` if present.
    pub fn discover(cwd: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(&cwd.join(path)),
            None => {
                let path = cwd.join(CONFIG_FILE_NAME);
                if path.exists() {
                    tracing::debug!("using config {}", path.display());
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve every relative path against `base`.
    pub fn rebase(&mut self, base: &Path) {
        let paths = [
            &mut self.inputs.build_config,
            &mut self.inputs.runtime,
            &mut self.inputs.presym,
            &mut self.outputs.headers,
            &mut self.outputs.sources,
            &mut self.build.scratch_dir,
        ];
        for path in paths.into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Inputs
        if other.inputs.build_config.is_some() {
            self.inputs.build_config = other.inputs.build_config;
        }
        if other.inputs.runtime.is_some() {
            self.inputs.runtime = other.inputs.runtime;
        }
        if other.inputs.presym.is_some() {
            self.inputs.presym = other.inputs.presym;
        }

        // Outputs
        if other.outputs.headers.is_some() {
            self.outputs.headers = other.outputs.headers;
        }
        if other.outputs.sources.is_some() {
            self.outputs.sources = other.outputs.sources;
        }

        // Build settings
        if other.build.tool.is_some() {
            self.build.tool = other.build.tool;
        }
        if other.build.tool_args.is_some() {
            self.build.tool_args = other.build.tool_args;
        }
        if other.build.clean_target.is_some() {
            self.build.clean_target = other.build.clean_target;
        }
        if other.build.build_target.is_some() {
            self.build.build_target = other.build.build_target;
        }
        if other.build.config_env.is_some() {
            self.build.config_env = other.build.config_env;
        }
        if other.build.timeout_secs.is_some() {
            self.build.timeout_secs = other.build.timeout_secs;
        }
        if other.build.retry_on_timeout.is_some() {
            self.build.retry_on_timeout = other.build.retry_on_timeout;
        }
        if other.build.scratch_dir.is_some() {
            self.build.scratch_dir = other.build.scratch_dir;
        }

        // Layout is file-only; a default layout means "not set"
        if other.layout != BuildLayout::default() {
            self.layout = other.layout;
        }

        if other.symbols.policy.is_some() {
            self.symbols.policy = other.symbols.policy;
        }
    }

    /// External build settings with defaults filled in.
    pub fn build_settings(&self) -> BuildSettings {
        let defaults = BuildSettings::default();
        BuildSettings {
            tool: self.build.tool.clone().unwrap_or(defaults.tool),
            tool_args: self.build.tool_args.clone().unwrap_or(defaults.tool_args),
            clean_target: self
                .build
                .clean_target
                .clone()
                .unwrap_or(defaults.clean_target),
            build_target: self
                .build
                .build_target
                .clone()
                .unwrap_or(defaults.build_target),
            config_env: self.build.config_env.clone().unwrap_or(defaults.config_env),
            timeout: self
                .build
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            retry_on_timeout: self
                .build
                .retry_on_timeout
                .unwrap_or(defaults.retry_on_timeout),
        }
    }

    /// Pipeline options, with unset paths defaulting to siblings in `cwd`.
    pub fn regen_options(&self, cwd: &Path) -> RegenOptions {
        let or_default = |path: &Option<PathBuf>, default: &str| {
            path.clone().unwrap_or_else(|| cwd.join(default))
        };

        RegenOptions {
            build_config: or_default(&self.inputs.build_config, DEFAULT_BUILD_CONFIG),
            runtime: or_default(&self.inputs.runtime, DEFAULT_RUNTIME),
            presym: or_default(&self.inputs.presym, DEFAULT_PRESYM),
            headers: or_default(&self.outputs.headers, DEFAULT_HEADERS),
            sources: or_default(&self.outputs.sources, DEFAULT_SOURCES),
            build: self.build_settings(),
            layout: self.layout.clone(),
            policy: self.symbols.policy.unwrap_or_default(),
            scratch_dir: self.build.scratch_dir.clone(),
        }
    }
}
