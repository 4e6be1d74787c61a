//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use embedlist::core::symbol::SymbolPolicy;

/// embedlist - regenerate the header/source manifests for an embedded runtime
#[derive(Parser)]
#[command(name = "embedlist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the runtime in isolation and rewrite both manifests
    Regen(RegenArgs),

    /// Merge a baseline symbol scan with a supplemental symbol file
    Presym(PresymArgs),

    /// Check that a host script defines the lifecycle callbacks
    CheckScript(CheckScriptArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct RegenArgs {
    /// Path to embedlist.toml (default: ./embedlist.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Build configuration file
    #[arg(long)]
    pub build_config: Option<PathBuf>,

    /// Runtime source checkout
    #[arg(long)]
    pub runtime: Option<PathBuf>,

    /// Supplemental symbol file
    #[arg(long)]
    pub presym: Option<PathBuf>,

    /// Headers manifest destination
    #[arg(long)]
    pub headers: Option<PathBuf>,

    /// Sources manifest destination
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Build tool executable
    #[arg(long)]
    pub tool: Option<String>,

    /// Per-step build timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory to create the build workspace in
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Supplemental symbol policy
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<SymbolPolicy>,

    /// Print a JSON report instead of status lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PresymArgs {
    /// Supplemental symbol file
    #[arg(long)]
    pub supplemental: PathBuf,

    /// Baseline symbol scan (default: stdin)
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Supplemental symbol policy
    #[arg(long, value_parser = parse_policy, default_value = "verbatim")]
    pub policy: SymbolPolicy,
}

#[derive(Args)]
pub struct CheckScriptArgs {
    /// Host script to check
    pub script: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_policy(s: &str) -> Result<SymbolPolicy, String> {
    s.parse()
}
