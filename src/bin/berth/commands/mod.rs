//! Command implementations

pub mod completions;
pub mod providers;
pub mod resolve;
