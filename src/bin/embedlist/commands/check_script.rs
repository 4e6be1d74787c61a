//! `embedlist check-script` command

use std::fs;

use anyhow::{Context, Result};

use crate::cli::CheckScriptArgs;
use embedlist::core::script::check_script;
use embedlist::util::shell::{Shell, Status};
use embedlist::util::diagnostic::{self, Diagnostic};

pub fn execute(args: CheckScriptArgs, shell: &Shell) -> Result<()> {
    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script: {}", args.script.display()))?;

    let report = check_script(&source);

    if shell.is_json() {
        let value = serde_json::json!({
            "script": args.script.display().to_string(),
            "ok": report.is_ok(),
            "missing": report.missing.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            "arity_mismatches": report
                .arity_mismatches
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "callback": m.callback.to_string(),
                        "found": m.found,
                    })
                })
                .collect::<Vec<_>>(),
        });
        shell.json(&value);
    } else if report.is_ok() {
        shell.status(
            Status::Finished,
            format!("{} defines all lifecycle callbacks", args.script.display()),
        );
    } else {
        let mut diag = Diagnostic::error("script does not satisfy the lifecycle callback contract")
            .with_location(&args.script);
        for callback in &report.missing {
            diag = diag.with_context(format!("missing `def {}` ({})", callback.name(), callback));
        }
        for mismatch in &report.arity_mismatches {
            diag = diag.with_context(format!(
                "`{}` takes {} parameter(s), expected {}",
                mismatch.callback.name(),
                mismatch.found,
                mismatch.callback.arity()
            ));
        }
        diagnostic::emit(&diag, shell.use_color());
    }

    if !report.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
