//! Isolated runtime builds.
//!
//! Stages inputs into a disposable workspace and drives the external build
//! tool with the symbol augmenter wired into its configuration.

pub mod presym;
pub mod runner;
pub mod workspace;

pub use presym::{SymbolAugmenter, SymbolSetBuilder};
pub use runner::{BuildConfiguration, BuildOutputTree, BuildSettings, BuildStep, IsolatedBuildRunner};
pub use workspace::{BuildInputs, Workspace};
