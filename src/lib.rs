//! embedlist - regenerates the minimal file manifest for embedding a
//! scripting runtime into a host engine.
//!
//! The pipeline builds the runtime from scratch in a throwaway workspace
//! with an augmented symbol set, then records exactly which headers and
//! sources that build needed.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for embedlist unit tests.
///
/// Only available when compiling tests. Provides a fake external build
/// tool and runtime checkout fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{IsolatedBuildRunner, SymbolAugmenter, SymbolSetBuilder};
pub use core::{BuildLayout, Manifest, SourceFile, Symbol, SymbolSet};
pub use ops::{regenerate, RegenError, RegenOptions, RegenReport};
pub use resolver::ArtifactSetResolver;
pub use util::config::Config;
