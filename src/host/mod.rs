//! Host implementations.
//!
//! The resolver only talks to the collaborator traits in
//! [`crate::core::host`]. This module provides in-memory implementations of
//! them and a TOML descriptor format that populates them.

pub mod descriptor;
pub mod memory;

pub use descriptor::ProjectDescriptor;
pub use memory::{InMemoryDataService, InMemoryProject, InMemoryWorkspace};
