//! `embedlist presym` command
//!
//! Called from the build configuration's symbol-scan hook: reads the
//! baseline scan, merges the supplemental file, and prints the result.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};

use crate::cli::PresymArgs;
use embedlist::builder::presym::{read_baseline, SymbolAugmenter, SymbolSetBuilder};

pub fn execute(args: PresymArgs) -> Result<()> {
    let augmenter = SymbolSetBuilder::from_file(&args.supplemental, args.policy)?;

    let baseline = match args.baseline {
        Some(ref path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open baseline scan: {}", path.display()))?;
            read_baseline(file)
        }
        None => read_baseline(io::stdin().lock()),
    }
    .context("failed to read baseline symbol scan")?;

    let scanned = baseline.len();
    let set = augmenter.augment(baseline);
    tracing::debug!(
        "{} baseline + {} supplemental -> {} symbols",
        scanned,
        augmenter.supplemental().len(),
        set.len()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    set.write_lines(&mut out)
        .and_then(|()| out.flush())
        .context("failed to write symbol set")?;

    Ok(())
}
