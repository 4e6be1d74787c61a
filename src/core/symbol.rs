//! Runtime symbols (presyms) and the ordered set the embedder consumes.
//!
//! Symbols are raw byte strings. The embedding step indexes them in
//! length-bucketed tables, so a [`SymbolSet`] is always ordered by byte
//! length first and lexicographic bytes second.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single symbol entry.
///
/// May contain leading sigils (`$`, `@`) or arbitrary bytes; nothing
/// here assumes the entry looks like an identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Vec<u8>);

impl Symbol {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Symbol(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length, the primary ordering key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol(s.as_bytes().to_vec())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(s.into_bytes())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

/// How entries from the supplemental symbol file are admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPolicy {
    /// Accept every non-blank line as-is, including non-UTF-8 bytes.
    #[default]
    Verbatim,
    /// Require UTF-8 without whitespace or control characters.
    Strict,
}

impl SymbolPolicy {
    /// Check a single entry against the policy.
    pub fn admits(&self, entry: &[u8]) -> bool {
        match self {
            SymbolPolicy::Verbatim => true,
            SymbolPolicy::Strict => match std::str::from_utf8(entry) {
                Ok(s) => !s.chars().any(|c| c.is_whitespace() || c.is_control()),
                Err(_) => false,
            },
        }
    }
}

impl FromStr for SymbolPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbatim" => Ok(SymbolPolicy::Verbatim),
            "strict" => Ok(SymbolPolicy::Strict),
            _ => Err(format!(
                "invalid symbol policy '{}'; expected 'verbatim' or 'strict'",
                s
            )),
        }
    }
}

/// Deduplicated, length-then-lexicographic ordered symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: BTreeSet<Symbol>,
}

impl SymbolSet {
    pub fn new() -> Self {
        SymbolSet::default()
    }

    /// Insert a symbol. Returns false if it was already present.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        self.symbols.insert(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate in embedding order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Write one symbol per line, raw bytes.
    pub fn write_lines<W: Write>(&self, mut out: W) -> io::Result<()> {
        for symbol in &self.symbols {
            out.write_all(symbol.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }
}

impl FromIterator<Symbol> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        SymbolSet {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl Extend<Symbol> for SymbolSet {
    fn extend<I: IntoIterator<Item = Symbol>>(&mut self, iter: I) {
        self.symbols.extend(iter);
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::collections::btree_set::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Split raw file contents into symbol lines.
///
/// Strips `\n` / `\r\n` terminators and skips blank lines.
pub fn split_lines(contents: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    contents
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix(b"\r").unwrap_or(line)))
        .filter(|(_, line)| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_then_lexicographic_order() {
        let set: SymbolSet = ["initialize", "foo", "a", "bar"]
            .into_iter()
            .map(Symbol::from)
            .collect();

        let ordered: Vec<_> = set.iter().map(|s| s.to_string()).collect();
        assert_eq!(ordered, vec!["a", "bar", "foo", "initialize"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = SymbolSet::new();
        assert!(set.insert(Symbol::from("a")));
        assert!(!set.insert(Symbol::from("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_raw_bytes_are_ordered_by_byte_length() {
        let set: SymbolSet = [
            Symbol::new(vec![0x01, 0x02, 0x03]),
            Symbol::from("$gv"),
            Symbol::from("zz"),
        ]
        .into_iter()
        .collect();

        let ordered: Vec<_> = set.iter().map(|s| s.as_bytes().to_vec()).collect();
        assert_eq!(
            ordered,
            vec![b"zz".to_vec(), vec![0x01, 0x02, 0x03], b"$gv".to_vec()]
        );
    }

    #[test]
    fn test_write_lines() {
        let set: SymbolSet = ["b", "a"].into_iter().map(Symbol::from).collect();
        let mut out = Vec::new();
        set.write_lines(&mut out).unwrap();
        assert_eq!(out, b"a\nb\n");
    }

    #[test]
    fn test_split_lines_strips_terminators_and_blanks() {
        let lines: Vec<_> = split_lines(b"bar\r\n\na\n").collect();
        assert_eq!(lines, vec![(1, &b"bar"[..]), (3, &b"a"[..])]);
    }

    #[test]
    fn test_strict_policy() {
        assert!(SymbolPolicy::Strict.admits(b"$global"));
        assert!(SymbolPolicy::Strict.admits(b"<=>"));
        assert!(!SymbolPolicy::Strict.admits(b"two words"));
        assert!(!SymbolPolicy::Strict.admits(&[0x01, 0x02]));
        assert!(!SymbolPolicy::Strict.admits(&[0xff, 0xfe]));
        assert!(SymbolPolicy::Verbatim.admits(&[0xff, 0xfe]));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Strict".parse::<SymbolPolicy>(), Ok(SymbolPolicy::Strict));
        assert!("lenient".parse::<SymbolPolicy>().is_err());
    }
}
