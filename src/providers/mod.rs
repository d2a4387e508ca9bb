//! Project system providers.
//!
//! A provider inspects a [`ProjectHandle`] and either builds a
//! [`ProjectSystem`] for it or declines. The factory tries providers in a
//! fixed order derived from each provider's `after` constraints:
//!
//! ```text
//! package-reference → legacy-package-reference → project-json → msbuild
//!   (deferred PR)        (loaded, opted in)        (manifest)     (catch-all)
//! ```

pub mod context;
pub mod errors;
pub mod factory;
pub mod legacy_package_reference;
pub mod msbuild;
pub mod ordering;
pub mod package_reference;
pub mod project_json;

use std::sync::Arc;

use anyhow::Result;

use crate::core::handle::ProjectHandle;
use crate::core::project_system::ProjectSystem;

pub use context::{MessageLevel, ProjectContext, ResolutionContext, TracingProjectContext};
pub use errors::{OrderingError, ProbeFault, ResolveError};
pub use factory::{ProjectSystemFactory, Resolution};

/// Provider names used in ordering constraints and configuration.
pub mod names {
    pub const PACKAGE_REFERENCE: &str = "package-reference";
    pub const LEGACY_PACKAGE_REFERENCE: &str = "legacy-package-reference";
    pub const PROJECT_JSON: &str = "project-json";
    pub const MSBUILD: &str = "msbuild";
}

/// A strategy that may build a project system for a project.
pub trait ProjectSystemProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Providers this one must be tried after.
    fn after(&self) -> &[&str] {
        &[]
    }

    /// Build a project system, or `Ok(None)` to decline.
    ///
    /// Errors are treated as a decline by the factory. A provider that
    /// declines must not leave visible side effects behind.
    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>>;
}

/// The built-in providers, in declaration order.
pub fn built_in() -> Vec<Arc<dyn ProjectSystemProvider>> {
    vec![
        Arc::new(msbuild::MsBuildProvider),
        Arc::new(project_json::ProjectJsonProvider),
        Arc::new(legacy_package_reference::LegacyPackageReferenceProvider),
        Arc::new(package_reference::PackageReferenceProvider),
    ]
}
