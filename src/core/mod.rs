//! Core data structures for embedlist.
//!
//! - Symbols and the ordered symbol set handed to the runtime build
//! - Source files and the manifests listing them
//! - The versioned build-output layout contract
//! - The host engine's script callback contract

pub mod layout;
pub mod manifest;
pub mod script;
pub mod source_file;
pub mod symbol;

pub use layout::BuildLayout;
pub use manifest::Manifest;
pub use source_file::{SourceFile, SourceKind};
pub use symbol::{Symbol, SymbolPolicy, SymbolSet};
