//! Symbol set augmentation.
//!
//! The runtime's build statically scans its script sources for the symbols
//! to intern. Symbols referenced only dynamically never show up in that
//! scan, so a supplemental file lists them explicitly and a
//! [`SymbolAugmenter`] merges the two before the build consumes the result.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::symbol::{split_lines, Symbol, SymbolPolicy, SymbolSet};
use crate::ops::errors::RegenError;

/// Environment variable naming the staged supplemental symbol file.
pub const PRESYM_ENV: &str = "EMBEDLIST_PRESYM";

/// Environment variable naming the `embedlist` executable, for build
/// configurations that call back into `embedlist presym`.
pub const BIN_ENV: &str = "EMBEDLIST_BIN";

/// Extension point for the build's symbol scan: given the scan result,
/// return the set the build should actually intern.
///
/// The scan runs inside the external build, in another process. The
/// augmenter crosses that boundary as a file: the runner stages
/// [`source_file`](SymbolAugmenter::source_file) into the workspace and the
/// build configuration calls `embedlist presym`, which loads it again and
/// applies [`augment`](SymbolAugmenter::augment).
pub trait SymbolAugmenter {
    fn augment(&self, baseline: Vec<Symbol>) -> SymbolSet;

    /// File the augmenter is loaded from.
    fn source_file(&self) -> &Path;
}

/// Augments a baseline scan with symbols from a supplemental file.
#[derive(Debug, Clone)]
pub struct SymbolSetBuilder {
    path: PathBuf,
    supplemental: Vec<Symbol>,
}

impl SymbolSetBuilder {
    /// Load the supplemental file, one literal symbol per line.
    ///
    /// Blank lines are skipped; every other line is admitted or rejected
    /// by `policy`.
    pub fn from_file(path: &Path, policy: SymbolPolicy) -> Result<Self, RegenError> {
        let contents = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RegenError::MissingInput {
                what: "supplemental symbol file",
                path: path.to_path_buf(),
            },
            _ => RegenError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let mut supplemental = Vec::new();
        for (line, entry) in split_lines(&contents) {
            if !policy.admits(entry) {
                return Err(RegenError::InvalidSymbol {
                    path: path.to_path_buf(),
                    line,
                    entry: entry.escape_ascii().to_string(),
                });
            }
            supplemental.push(Symbol::new(entry));
        }

        tracing::debug!(
            "loaded {} supplemental symbols from {}",
            supplemental.len(),
            path.display()
        );

        Ok(SymbolSetBuilder {
            path: path.to_path_buf(),
            supplemental,
        })
    }

    /// Symbols listed in the supplemental file, in file order.
    pub fn supplemental(&self) -> &[Symbol] {
        &self.supplemental
    }
}

impl SymbolAugmenter for SymbolSetBuilder {
    fn augment(&self, baseline: Vec<Symbol>) -> SymbolSet {
        let mut set: SymbolSet = baseline.into_iter().collect();
        set.extend(self.supplemental.iter().cloned());
        set
    }

    fn source_file(&self) -> &Path {
        &self.path
    }
}

/// Read a baseline scan, one symbol per line.
pub fn read_baseline<R: Read>(mut reader: R) -> io::Result<Vec<Symbol>> {
    let mut contents = Vec::new();
    reader.read_to_end(&mut contents)?;
    Ok(split_lines(&contents)
        .map(|(_, entry)| Symbol::new(entry))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn symbols(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|n| Symbol::from(*n)).collect()
    }

    #[test]
    fn test_augment_unions_and_orders() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mruby-presym.txt");
        fs::write(&path, "bar\na\n").unwrap();

        let builder = SymbolSetBuilder::from_file(&path, SymbolPolicy::Verbatim).unwrap();
        assert_eq!(builder.source_file(), path.as_path());
        let set = builder.augment(symbols(&["foo", "initialize", "a"]));

        let ordered: Vec<_> = set.iter().map(|s| s.to_string()).collect();
        assert_eq!(ordered, vec!["a", "bar", "foo", "initialize"]);
    }

    #[test]
    fn test_augment_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("presym");
        fs::write(&path, "zeta\n$gv\n@iv\nalpha\n").unwrap();
        let builder = SymbolSetBuilder::from_file(&path, SymbolPolicy::Verbatim).unwrap();

        let render = |baseline: Vec<Symbol>| {
            let mut out = Vec::new();
            builder.augment(baseline).write_lines(&mut out).unwrap();
            out
        };

        let first = render(symbols(&["beta", "alpha", "x"]));
        let second = render(symbols(&["x", "alpha", "beta"]));
        assert_eq!(first, second);
        assert_eq!(first, b"x\n$gv\n@iv\nbeta\nzeta\nalpha\n");
    }

    #[test]
    fn test_raw_bytes_accepted_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("presym");
        fs::write(&path, b"\x01\x02\x03\nfoo\n").unwrap();

        let builder = SymbolSetBuilder::from_file(&path, SymbolPolicy::Verbatim).unwrap();
        assert_eq!(builder.supplemental().len(), 2);
        assert_eq!(builder.supplemental()[0].as_bytes(), b"\x01\x02\x03");
    }

    #[test]
    fn test_strict_policy_rejects_with_line_number() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("presym");
        fs::write(&path, b"foo\n\nbad entry\n").unwrap();

        let err = SymbolSetBuilder::from_file(&path, SymbolPolicy::Strict).unwrap_err();
        match err {
            RegenError::InvalidSymbol { line, entry, .. } => {
                assert_eq!(line, 3);
                assert_eq!(entry, "bad entry");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_file_is_missing_input() {
        let tmp = TempDir::new().unwrap();
        let err = SymbolSetBuilder::from_file(&tmp.path().join("nope"), SymbolPolicy::Verbatim)
            .unwrap_err();
        assert!(matches!(err, RegenError::MissingInput { .. }));
    }

    #[test]
    fn test_read_baseline() {
        let baseline = read_baseline(&b"initialize\r\nfoo\n\n"[..]).unwrap();
        assert_eq!(baseline, symbols(&["initialize", "foo"]));
    }
}
