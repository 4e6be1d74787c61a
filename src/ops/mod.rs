//! High-level operations.
//!
//! This module contains the implementation of embedlist commands.

pub mod errors;
pub mod regen;
pub mod write_manifests;

pub use errors::{ErrorKind, RegenError};
pub use regen::{regenerate, RegenOptions, RegenReport};
pub use write_manifests::ManifestWriter;
