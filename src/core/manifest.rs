//! Flat file manifests consumed by the downstream embedding build.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::source_file::{SourceFile, SourceKind};

/// An ordered, duplicate-free list of files.
///
/// `kind` names the list (headers or sources), not its entries: the
/// sources list also carries the headers found beside the sources.
/// Order is enumeration order and is never re-sorted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    kind: SourceKind,
    files: Vec<SourceFile>,
    seen: HashSet<PathBuf>,
}

impl Manifest {
    pub fn new(kind: SourceKind) -> Self {
        Manifest {
            kind,
            files: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Append a file unless its path is already listed.
    ///
    /// Returns whether the file was added.
    pub fn push(&mut self, file: SourceFile) -> bool {
        if !self.seen.insert(file.path().to_path_buf()) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// One path per line, each line newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(&file.to_slash());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_preserves_order() {
        let mut manifest = Manifest::new(SourceKind::Source);
        manifest.push(SourceFile::new("mruby/src/vm.c", SourceKind::Source).unwrap());
        manifest.push(SourceFile::new("mruby/src/array.c", SourceKind::Source).unwrap());
        manifest.push(SourceFile::new("mruby/src/value_array.h", SourceKind::Header).unwrap());

        assert_eq!(manifest.len(), 3);
        assert_eq!(
            manifest.render(),
            "mruby/src/vm.c\nmruby/src/array.c\nmruby/src/value_array.h\n"
        );
    }

    #[test]
    fn test_duplicate_paths_are_listed_once() {
        let mut manifest = Manifest::new(SourceKind::Header);
        assert!(manifest.push(SourceFile::new("mruby/include/mruby.h", SourceKind::Header).unwrap()));
        assert!(!manifest.push(SourceFile::new("mruby/include/mruby.h", SourceKind::Header).unwrap()));

        assert_eq!(manifest.render(), "mruby/include/mruby.h\n");
    }

    #[test]
    fn test_empty_manifest_renders_empty() {
        assert_eq!(Manifest::new(SourceKind::Header).render(), "");
    }
}
