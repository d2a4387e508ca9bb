//! Collaborator contracts supplied by the hosting environment.
//!
//! The resolver never owns a project. It reads one through these traits:
//!
//! - [`HostProject`] – one project as the host knows it, loaded or not
//! - [`ProjectModel`] – the live object model of a loaded project
//! - [`DeferredWorkspace`] – lightweight queries for not-yet-loaded projects
//! - [`ProjectDataService`] – item/property queries for one deferred project

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::properties::BuildPropertySource;

/// Item type of package references in the project model.
pub const PACKAGE_REFERENCE_ITEM: &str = "PackageReference";

/// Native capability exposed by projects that understand package references.
pub const PACKAGE_REFERENCES_CAPABILITY: &str = "PackageReferences";

/// An evaluated project item (`<PackageReference Include="..." Version="..." />`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub item_type: String,
    pub include: String,
    pub metadata: BTreeMap<String, String>,
}

impl ProjectItem {
    pub fn new(item_type: impl Into<String>, include: impl Into<String>) -> Self {
        ProjectItem {
            item_type: item_type.into(),
            include: include.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// One project as seen by the host, whatever its load state.
#[async_trait]
pub trait HostProject: Send + Sync {
    fn name(&self) -> &str;

    /// Stable project id; `None` when the host hasn't assigned one.
    fn project_id(&self) -> Option<&str>;

    /// Whether the project is still deferred. Asked fresh on every call.
    async fn is_deferred(&self) -> Result<bool>;

    /// Project file location known from solution metadata.
    fn hierarchy_path(&self) -> &Path;

    /// Type classifiers from solution metadata (available while deferred).
    fn hierarchy_type_guids(&self) -> Vec<String>;

    fn build_properties(&self) -> Arc<dyn BuildPropertySource>;

    /// Materialise the live project model, loading the project if needed.
    ///
    /// Returns `Ok(None)` when the host cannot load the project on demand.
    async fn load_project(&self) -> Result<Option<Arc<dyn ProjectModel>>>;
}

/// Live object model of a loaded project.
///
/// Only touched from the coordinating context; implementations use interior
/// mutability for writes.
pub trait ProjectModel: Send + Sync {
    /// Absolute path of the project file.
    fn full_path(&self) -> PathBuf;

    fn type_guids(&self) -> Vec<String>;

    fn has_capability(&self, capability: &str) -> bool;

    fn items(&self, item_type: &str) -> Vec<ProjectItem>;

    /// Add an item, or replace the existing one with the same type and include.
    fn upsert_item(&self, item: ProjectItem) -> Result<()>;

    /// Remove an item. Returns `false` if it wasn't present.
    fn remove_item(&self, item_type: &str, include: &str) -> Result<bool>;

    /// Project files referenced by this project.
    fn project_references(&self) -> Vec<PathBuf>;
}

/// Queries served for deferred projects without loading them.
#[async_trait]
pub trait DeferredWorkspace: Send + Sync {
    /// Whether a file exists in the workspace's logical view.
    async fn entity_exists(&self, path: &Path) -> Result<bool>;

    /// Project files referenced by the project at `project_file`.
    async fn project_references(&self, project_file: &Path) -> Result<Vec<PathBuf>>;

    /// Item/property query service for one project; `None` if unknown.
    async fn project_data_service(
        &self,
        project_file: &Path,
    ) -> Result<Option<Arc<dyn ProjectDataService>>>;
}

/// Item and property queries for one deferred project.
#[async_trait]
pub trait ProjectDataService: Send + Sync {
    async fn items(&self, item_type: &str) -> Result<Vec<ProjectItem>>;

    async fn property(&self, name: &str) -> Result<Option<String>>;
}
