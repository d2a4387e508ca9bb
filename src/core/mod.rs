//! Core data structures for berth.
//!
//! This module contains the types every provider works against:
//! - Project-type classifiers and build-property names
//! - Host collaborator traits (project, model, deferred workspace)
//! - The project handle and target-framework derivation
//! - The resolved project system

pub mod framework;
pub mod handle;
pub mod host;
pub mod project_system;
pub mod project_type;
pub mod properties;

pub use framework::FrameworkName;
pub use handle::ProjectHandle;
pub use host::{DeferredWorkspace, HostProject, ProjectDataService, ProjectItem, ProjectModel};
pub use project_system::{MsBuildFlavor, ProjectKind, ProjectStyle, ProjectSystem};
pub use project_type::{ProjectType, ProjectTypes};
pub use properties::{BuildPropertySource, RestoreStyle};
