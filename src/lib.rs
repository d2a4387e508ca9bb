//! berth - project system resolution for IDE-managed projects
//!
//! Given a project that may be fully loaded or still deferred, berth picks
//! the representation that tracks its package dependencies and wires up the
//! services that read and edit them.

pub mod core;
pub mod host;
pub mod providers;
pub mod services;
pub mod util;

/// Test utilities for berth unit tests.
///
/// Only available when compiling tests. Provides handle construction over
/// in-memory hosts, scripted providers and counting fallback factories.
#[cfg(test)]
pub mod test_support;

pub use core::{ProjectHandle, ProjectSystem};
pub use providers::{ProjectSystemFactory, ProjectSystemProvider, ResolutionContext, ResolveError};
pub use services::{ProjectServices, ServiceBundle, ServiceError};
pub use util::coordinator::Coordinator;
