//! Artifact set resolution.
//!
//! Works out which header and source files make up the runtime that was
//! actually built: the baseline directories, one source directory per
//! feature module the build compiled, and any headers that exist only as
//! build output.
//!
//! Everything classified under a candidate directory goes into the sources
//! list, headers included. The headers list is taken from the build-output
//! tree alone, so it holds the generated headers the downstream build has
//! to put on its include path.
//!
//! Feature modules are discovered from the build output alone. Which
//! modules get compiled is the build system's decision (driven in part by
//! the augmented symbol set), so nothing here second-guesses it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::builder::runner::BuildOutputTree;
use crate::core::layout::BuildLayout;
use crate::core::manifest::Manifest;
use crate::core::source_file::{SourceFile, SourceKind};
use crate::ops::errors::RegenError;
use crate::util::fs::relative_path;

/// The resolved minimal file set for one build.
#[derive(Debug, Clone)]
pub struct ResolvedArtifacts {
    pub headers: Manifest,
    pub sources: Manifest,
    /// Feature modules found in the build output, sorted by name
    pub features: Vec<OsString>,
    /// Feature modules with no source directory in the checkout
    pub skipped_features: Vec<OsString>,
}

/// A directory whose files belong to the sources list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDir {
    pub path: PathBuf,
    pub feature: Option<OsString>,
}

/// Resolves the artifact set from a build-output tree.
#[derive(Debug, Clone)]
pub struct ArtifactSetResolver<'a> {
    layout: &'a BuildLayout,
}

impl<'a> ArtifactSetResolver<'a> {
    pub fn new(layout: &'a BuildLayout) -> Self {
        ArtifactSetResolver { layout }
    }

    /// Resolve headers and sources.
    ///
    /// Sources are enumerated from the baseline directories, then the
    /// feature modules; headers from the build-output tree. Each directory
    /// is walked in file-name order.
    pub fn resolve(&self, tree: &BuildOutputTree<'_>) -> Result<ResolvedArtifacts, RegenError> {
        let features = self.discover_features(tree)?;
        let (candidates, skipped_features) = self.candidate_dirs(tree, &features)?;
        let root = tree.workspace_root();

        let mut sources = Manifest::new(SourceKind::Source);
        for candidate in &candidates {
            tracing::debug!("scanning {}", candidate.path.display());
            for path in walk_files(&candidate.path)? {
                if let Some(kind) = self.layout.classify(&path) {
                    sources.push(contained(root, &path, kind)?);
                }
            }
        }

        let mut headers = Manifest::new(SourceKind::Header);
        for path in walk_files(tree.build_root())? {
            if let Some(SourceKind::Header) = self.layout.classify(&path) {
                headers.push(contained(root, &path, SourceKind::Header)?);
            }
        }

        tracing::debug!(
            "resolved {} headers and {} sources from {} directories",
            headers.len(),
            sources.len(),
            candidates.len()
        );

        Ok(ResolvedArtifacts {
            headers,
            sources,
            features,
            skipped_features,
        })
    }

    /// List the feature modules the build compiled.
    pub fn discover_features(
        &self,
        tree: &BuildOutputTree<'_>,
    ) -> Result<Vec<OsString>, RegenError> {
        let area = tree.runtime_root().join(&self.layout.feature_output);
        if !area.is_dir() {
            return Err(RegenError::Integrity { path: area });
        }

        let entries = fs::read_dir(&area).map_err(|e| RegenError::Read {
            path: area.clone(),
            source: e,
        })?;

        let mut features = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RegenError::Read {
                path: area.clone(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| RegenError::Read {
                path: entry.path(),
                source: e,
            })?;
            if file_type.is_dir() {
                features.push(entry.file_name());
            }
        }

        features.sort();
        Ok(features)
    }

    /// Baseline directories followed by one directory per feature module.
    ///
    /// Also returns the feature modules whose source directory is missing.
    pub fn candidate_dirs(
        &self,
        tree: &BuildOutputTree<'_>,
        features: &[OsString],
    ) -> Result<(Vec<CandidateDir>, Vec<OsString>), RegenError> {
        let mut candidates = Vec::new();

        for dir in &self.layout.baseline_dirs {
            let path = tree.runtime_root().join(dir);
            if !path.is_dir() {
                return Err(RegenError::Integrity { path });
            }
            candidates.push(CandidateDir {
                path,
                feature: None,
            });
        }

        let mut skipped = Vec::new();
        let feature_root = tree.runtime_root().join(&self.layout.feature_sources);
        for feature in features {
            let path = feature_root.join(feature);
            if path.is_dir() {
                candidates.push(CandidateDir {
                    path,
                    feature: Some(feature.clone()),
                });
            } else {
                tracing::debug!("no source directory at {}", path.display());
                skipped.push(feature.clone());
            }
        }

        Ok((candidates, skipped))
    }
}

/// `path` as a workspace-relative file, or `PathEscape` if it lies outside.
fn contained(root: &Path, path: &Path, kind: SourceKind) -> Result<SourceFile, RegenError> {
    let relative = relative_path(root, path);
    SourceFile::new(relative, kind).ok_or_else(|| RegenError::PathEscape {
        path: path.to_path_buf(),
    })
}

/// Every regular file under `dir`, in file-name order. Symlinks are not
/// followed.
fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, RegenError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| RegenError::Read {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_build_output, write_runtime_checkout};
    use tempfile::TempDir;

    fn resolve_fixture(ws: &Path) -> Result<ResolvedArtifacts, RegenError> {
        let runtime = ws.join("mruby");
        let layout = BuildLayout::default();
        let tree = BuildOutputTree::new(ws, &runtime, &layout);
        ArtifactSetResolver::new(&layout).resolve(&tree)
    }

    fn rendered(manifest: &Manifest) -> Vec<String> {
        manifest.files().iter().map(|f| f.to_slash()).collect()
    }

    fn names(features: &[OsString]) -> Vec<String> {
        features
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_resolve_splits_candidate_files_from_build_headers() {
        let tmp = TempDir::new().unwrap();
        write_runtime_checkout(&tmp.path().join("mruby"));
        write_build_output(&tmp.path().join("mruby"));

        let artifacts = resolve_fixture(tmp.path()).unwrap();

        assert_eq!(
            names(&artifacts.features),
            vec!["mruby-math", "mruby-string-ext"]
        );
        assert!(artifacts.skipped_features.is_empty());
        assert_eq!(
            rendered(&artifacts.sources),
            vec![
                "mruby/src/array.c",
                "mruby/src/value_array.h",
                "mruby/build/host/mrblib/mrblib.c",
                "mruby/build/host/mrbgems/gem_init.c",
                "mruby/build/host/mrbgems/mruby-math/gem_init.c",
                "mruby/build/host/mrbgems/mruby-math/gem_math.h",
                "mruby/build/host/mrbgems/mruby-string-ext/gem_init.c",
                "mruby/mrbgems/mruby-math/src/math.c",
                "mruby/mrbgems/mruby-string-ext/src/string.c",
            ]
        );
        assert_eq!(
            rendered(&artifacts.headers),
            vec![
                "mruby/build/host/include/mruby/presym/id.h",
                "mruby/build/host/include/mruby/presym/table.h",
                "mruby/build/host/mrbgems/mruby-math/gem_math.h",
            ]
        );
    }

    #[test]
    fn test_checkout_headers_stay_out_of_headers_manifest() {
        let tmp = TempDir::new().unwrap();
        write_runtime_checkout(&tmp.path().join("mruby"));
        write_build_output(&tmp.path().join("mruby"));

        let artifacts = resolve_fixture(tmp.path()).unwrap();
        let headers = rendered(&artifacts.headers);
        assert!(!headers.iter().any(|p| p.ends_with("value_array.h")));
        assert!(!headers.iter().any(|p| p.ends_with("include/mruby.h")));
        assert!(headers.iter().all(|p| p.starts_with("mruby/build/")));
    }

    #[test]
    fn test_unbuilt_feature_sources_are_excluded() {
        let tmp = TempDir::new().unwrap();
        write_runtime_checkout(&tmp.path().join("mruby"));
        write_build_output(&tmp.path().join("mruby"));

        let artifacts = resolve_fixture(tmp.path()).unwrap();
        assert!(!rendered(&artifacts.sources)
            .iter()
            .any(|p| p.contains("mruby-unused")));
    }

    #[test]
    fn test_five_candidate_directories() {
        let tmp = TempDir::new().unwrap();
        let runtime = tmp.path().join("mruby");
        write_runtime_checkout(&runtime);
        write_build_output(&runtime);

        let layout = BuildLayout::default();
        let tree = BuildOutputTree::new(tmp.path(), &runtime, &layout);
        let resolver = ArtifactSetResolver::new(&layout);
        let features = resolver.discover_features(&tree).unwrap();
        let (candidates, skipped) = resolver.candidate_dirs(&tree, &features).unwrap();

        assert_eq!(candidates.len(), 5);
        assert!(skipped.is_empty());
        assert_eq!(
            candidates.iter().filter(|c| c.feature.is_some()).count(),
            2
        );
    }

    #[test]
    fn test_no_path_is_absolute_or_escapes() {
        let tmp = TempDir::new().unwrap();
        write_runtime_checkout(&tmp.path().join("mruby"));
        write_build_output(&tmp.path().join("mruby"));

        let artifacts = resolve_fixture(tmp.path()).unwrap();
        for file in artifacts
            .headers
            .files()
            .iter()
            .chain(artifacts.sources.files())
        {
            assert!(file.path().is_relative());
            assert!(tmp.path().join(file.path()).starts_with(tmp.path()));
            assert!(!file.to_slash().contains(".."));
        }
    }

    #[test]
    fn test_missing_baseline_dir_is_integrity_error() {
        let tmp = TempDir::new().unwrap();
        let runtime = tmp.path().join("mruby");
        write_runtime_checkout(&runtime);
        write_build_output(&runtime);
        fs::remove_dir_all(runtime.join("build/host/mrblib")).unwrap();

        match resolve_fixture(tmp.path()).unwrap_err() {
            RegenError::Integrity { path } => assert!(path.ends_with("build/host/mrblib")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_feature_output_is_integrity_error() {
        let tmp = TempDir::new().unwrap();
        write_runtime_checkout(&tmp.path().join("mruby"));

        let err = resolve_fixture(tmp.path()).unwrap_err();
        assert!(matches!(err, RegenError::Integrity { .. }));
    }

    #[test]
    fn test_feature_without_sources_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let runtime = tmp.path().join("mruby");
        write_runtime_checkout(&runtime);
        write_build_output(&runtime);
        fs::create_dir_all(runtime.join("build/host/mrbgems/mruby-remote")).unwrap();

        let artifacts = resolve_fixture(tmp.path()).unwrap();
        assert_eq!(
            names(&artifacts.features),
            vec!["mruby-math", "mruby-remote", "mruby-string-ext"]
        );
        assert_eq!(names(&artifacts.skipped_features), vec!["mruby-remote"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_feature_name_finds_its_sources() {
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let runtime = tmp.path().join("mruby");
        write_runtime_checkout(&runtime);
        write_build_output(&runtime);
        let name = std::ffi::OsStr::from_bytes(b"mruby-\xff");
        fs::create_dir_all(runtime.join("build/host/mrbgems").join(name)).unwrap();
        fs::create_dir_all(runtime.join("mrbgems").join(name)).unwrap();

        let artifacts = resolve_fixture(tmp.path()).unwrap();
        assert!(artifacts.features.iter().any(|f| f.as_os_str() == name));
        assert!(artifacts.skipped_features.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_out_of_tree_are_not_followed() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("ws");
        let runtime = ws.join("mruby");
        write_runtime_checkout(&runtime);
        write_build_output(&runtime);

        let outside = tmp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("leak.c"), "int leak;").unwrap();
        std::os::unix::fs::symlink(&outside, runtime.join("src/linked")).unwrap();

        let artifacts = resolve_fixture(&ws).unwrap();
        assert!(!rendered(&artifacts.sources)
            .iter()
            .any(|p| p.contains("leak.c")));
    }
}
