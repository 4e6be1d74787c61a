//! Command implementations

pub mod check_script;
pub mod completions;
pub mod presym;
pub mod regen;
