//! Fine-grained project services.
//!
//! A resolved project system exposes its behaviour through four service
//! kinds. Each kind is a trait; a representation binds exactly one
//! implementation per kind, either in a plain [`ServiceBundle`] or behind a
//! [`DeferredServiceProxy`] that switches implementations as the project loads.
//!
//! ```text
//!                  ProjectServices
//!          ┌──────────────┴──────────────┐
//!   ServiceBundle                 DeferredServiceProxy
//!   (fixed slots)          ┌──────────┴──────────┐
//!                     workspace bundle     fallback bundle
//!                     (while deferred)     (built once, on load)
//! ```

pub mod bundle;
pub mod classic;
pub mod errors;
pub mod managed;
pub mod manifest;
pub mod proxy;
pub mod workspace;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::host::ProjectModel;

pub use bundle::ServiceBundle;
pub use errors::ServiceError;
pub use proxy::{DeferredServiceProxy, FallbackFactory, ProxyState};

/// The kinds of service a representation can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Capabilities,
    ReferencesReader,
    ReferencesWriter,
    BuildSystem,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Capabilities,
        ServiceKind::ReferencesReader,
        ServiceKind::ReferencesWriter,
        ServiceKind::BuildSystem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Capabilities => "capabilities",
            ServiceKind::ReferencesReader => "references reader",
            ServiceKind::ReferencesWriter => "references writer",
            ServiceKind::BuildSystem => "build system",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A package dependency declared by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub name: String,
    /// Version range as written; `None` when floating or centrally managed.
    pub version: Option<String>,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        PackageReference {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Capability flags of a project.
pub trait ProjectCapabilities: Send + Sync {
    fn supports_package_references(&self) -> Result<bool, ServiceError>;

    /// Whether restore should be nominated as soon as the solution opens.
    fn nominates_on_solution_load(&self) -> Result<bool, ServiceError>;
}

/// Reads a project's package and project references.
pub trait ReferencesReader: Send + Sync {
    fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError>;

    fn project_references(&self) -> Result<Vec<PathBuf>, ServiceError>;
}

/// Adds and removes package references.
pub trait ReferencesWriter: Send + Sync {
    /// Add a reference, or update the version of an existing one.
    fn add_or_update_package_reference(
        &self,
        reference: &PackageReference,
    ) -> Result<(), ServiceError>;

    /// Remove a reference. Returns `false` when it wasn't there.
    fn remove_package_reference(&self, name: &str) -> Result<bool, ServiceError>;
}

/// Generic access to the underlying build system.
pub trait BuildSystemAccessor: Send + Sync {
    fn project_file(&self) -> Result<PathBuf, ServiceError>;

    fn property(&self, name: &str) -> Option<String>;

    fn project_model(&self) -> Result<Arc<dyn ProjectModel>, ServiceError>;
}

/// Per-kind access to a representation's services.
pub trait ProjectServices: Send + Sync {
    fn capabilities(&self) -> Result<&dyn ProjectCapabilities, ServiceError>;

    fn references_reader(&self) -> Result<&dyn ReferencesReader, ServiceError>;

    fn references_writer(&self) -> Result<&dyn ReferencesWriter, ServiceError>;

    fn build_system(&self) -> Result<&dyn BuildSystemAccessor, ServiceError>;
}
