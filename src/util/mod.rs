//! Shared utilities

pub mod config;
pub mod coordinator;
pub mod diagnostic;

pub use config::Config;
pub use coordinator::Coordinator;
pub use diagnostic::Diagnostic;
