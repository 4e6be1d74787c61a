//! embedlist CLI - regenerates the embedded runtime's file manifests

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use embedlist::util::diagnostic;
use embedlist::util::shell::Shell;
use embedlist::util::Interrupt;
use embedlist::RegenError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color, json_requested(&cli));

    if let Err(e) = run(cli, &shell) {
        match e.downcast_ref::<RegenError>() {
            Some(err) => {
                diagnostic::emit(&err.to_diagnostic(), shell.use_color());
                std::process::exit(err.kind().exit_code());
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("embedlist=debug")
    } else if cli.quiet || shell.is_json() {
        EnvFilter::new("embedlist=error")
    } else {
        EnvFilter::new("embedlist=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Regen(args) => commands::regen::execute(args, shell, &Interrupt::install()),
        Commands::Presym(args) => commands::presym::execute(args),
        Commands::CheckScript(args) => commands::check_script::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn json_requested(cli: &Cli) -> bool {
    match &cli.command {
        Commands::Regen(args) => args.json,
        Commands::CheckScript(args) => args.json,
        _ => false,
    }
}
