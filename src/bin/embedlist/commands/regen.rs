//! `embedlist regen` command

use anyhow::{Context, Result};

use crate::cli::RegenArgs;
use embedlist::ops::regen::regenerate;
use embedlist::util::config::Config;
use embedlist::util::shell::{Shell, Status};
use embedlist::util::Interrupt;

pub fn execute(args: RegenArgs, shell: &Shell, interrupt: &Interrupt) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    // Load configuration (file + command line)
    let mut config = Config::discover(&cwd, args.config.as_deref())?;
    let mut overrides = Config::default();
    overrides.inputs.build_config = args.build_config;
    overrides.inputs.runtime = args.runtime;
    overrides.inputs.presym = args.presym;
    overrides.outputs.headers = args.headers;
    overrides.outputs.sources = args.sources;
    overrides.build.tool = args.tool;
    overrides.build.timeout_secs = args.timeout;
    overrides.build.scratch_dir = args.scratch_dir;
    overrides.symbols.policy = args.policy;
    overrides.rebase(&cwd);
    config.merge(overrides);

    let opts = config.regen_options(&cwd);

    let spinner = shell.spinner(
        Status::Building,
        format!("{} (isolated workspace)", opts.runtime.display()),
    );
    let report = regenerate(&opts, interrupt)?;
    let elapsed = spinner.finish();

    for feature in &report.skipped_features {
        shell.warn(format!(
            "feature module `{}` has no source directory; skipped",
            feature
        ));
    }

    if shell.is_json() {
        let value = serde_json::to_value(&report).context("failed to serialize report")?;
        shell.json(&value);
        return Ok(());
    }

    shell.status(
        Status::Wrote,
        format!("{} ({} paths)", report.headers_path.display(), report.headers),
    );
    shell.status(
        Status::Wrote,
        format!("{} ({} paths)", report.sources_path.display(), report.sources),
    );
    shell.status(
        Status::Finished,
        format!(
            "Identified {} header files / {} source files in {}",
            report.headers, report.sources, elapsed
        ),
    );

    Ok(())
}
