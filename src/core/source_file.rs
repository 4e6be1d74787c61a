//! Source file classification.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Whether a file is a header or a compilable source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Header,
    Source,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Header => write!(f, "header"),
            SourceKind::Source => write!(f, "source"),
        }
    }
}

/// A header or source file, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    path: PathBuf,
    kind: SourceKind,
}

impl SourceFile {
    /// Create a source file entry.
    ///
    /// Returns `None` if the path is absolute or climbs out of its root.
    pub fn new(path: impl Into<PathBuf>, kind: SourceKind) -> Option<Self> {
        let path = path.into();
        if !is_contained(&path) {
            return None;
        }
        Some(SourceFile { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Render with `/` separators regardless of host platform.
    pub fn to_slash(&self) -> String {
        self.path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_slash())
    }
}

/// True if a relative path never leaves the directory it is relative to.
pub fn is_contained(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    let mut depth: usize = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}
