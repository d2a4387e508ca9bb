//! Services answered by the deferred workspace.
//!
//! These never load the project. Queries are asynchronous and joined on the
//! coordinating context.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::handle::ProjectHandle;
use crate::core::host::{ProjectDataService, PACKAGE_REFERENCE_ITEM};
use crate::services::classic::StaticCapabilities;
use crate::services::managed::reference_from_item;
use crate::services::{
    PackageReference, ProjectCapabilities, ReferencesReader, ServiceBundle, ServiceError,
};

/// Bundle with the capability and reader slots served from the workspace.
pub fn workspace_bundle(handle: &Arc<ProjectHandle>) -> Result<ServiceBundle, ServiceError> {
    let mut bundle = ServiceBundle::new();
    bundle.bind_capabilities(Arc::new(WorkspaceCapabilities::new(handle.clone())))?;
    bundle.bind_references_reader(Arc::new(WorkspaceReferencesReader::new(handle.clone())))?;
    Ok(bundle)
}

/// Deferred view of a packages.config project: fixed capability flags and
/// references read from the workspace.
pub fn classic_workspace_bundle(
    handle: &Arc<ProjectHandle>,
) -> Result<ServiceBundle, ServiceError> {
    let mut bundle = ServiceBundle::new();
    bundle.bind_capabilities(Arc::new(StaticCapabilities::packages_config()))?;
    bundle.bind_references_reader(Arc::new(WorkspaceReferencesReader::new(handle.clone())))?;
    Ok(bundle)
}

/// The workspace's data service for the project, which every
/// workspace-backed read goes through.
pub fn require_data_service(
    handle: &ProjectHandle,
) -> Result<Arc<dyn ProjectDataService>, ServiceError> {
    handle.coordinator().join(data_service(handle))
}

async fn data_service(
    handle: &ProjectHandle,
) -> Result<Arc<dyn ProjectDataService>, ServiceError> {
    let path = handle.hierarchy_path();
    handle
        .workspace()
        .project_data_service(path)
        .await?
        .ok_or_else(|| {
            ServiceError::missing(format!("project data service for {}", path.display()))
        })
}

/// Capability flags of a deferred package-reference project.
pub struct WorkspaceCapabilities {
    handle: Arc<ProjectHandle>,
}

impl WorkspaceCapabilities {
    pub fn new(handle: Arc<ProjectHandle>) -> Self {
        WorkspaceCapabilities { handle }
    }
}

impl ProjectCapabilities for WorkspaceCapabilities {
    fn supports_package_references(&self) -> Result<bool, ServiceError> {
        Ok(true)
    }

    /// Nominate early only when the project is known to use package references.
    fn nominates_on_solution_load(&self) -> Result<bool, ServiceError> {
        let handle = &self.handle;
        handle.coordinator().join(async {
            if handle
                .restore_style_async()
                .await
                .is_some_and(|s| s.is_package_reference())
            {
                return Ok(true);
            }
            let items = data_service(handle)
                .await?
                .items(PACKAGE_REFERENCE_ITEM)
                .await?;
            Ok::<bool, ServiceError>(!items.is_empty())
        })
    }
}

/// Reads references from the workspace's view of the project.
pub struct WorkspaceReferencesReader {
    handle: Arc<ProjectHandle>,
}

impl WorkspaceReferencesReader {
    pub fn new(handle: Arc<ProjectHandle>) -> Self {
        WorkspaceReferencesReader { handle }
    }
}

impl ReferencesReader for WorkspaceReferencesReader {
    fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError> {
        let handle = &self.handle;
        handle.coordinator().join(async {
            let items = data_service(handle)
                .await?
                .items(PACKAGE_REFERENCE_ITEM)
                .await?;
            Ok::<Vec<PackageReference>, ServiceError>(
                items.iter().map(reference_from_item).collect(),
            )
        })
    }

    fn project_references(&self) -> Result<Vec<PathBuf>, ServiceError> {
        let handle = &self.handle;
        let references = handle.coordinator().join(
            handle
                .workspace()
                .project_references(handle.hierarchy_path()),
        )?;
        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::ProjectItem;
    use crate::core::properties::names;
    use crate::host::memory::{InMemoryDataService, InMemoryProject, InMemoryWorkspace};
    use crate::services::ProjectServices;
    use crate::test_support::handle_for;

    const PATH: &str = "/src/App/App.csproj";

    #[test]
    fn test_reads_items_from_workspace() {
        let workspace = InMemoryWorkspace::new()
            .with_project_data(
                PATH,
                InMemoryDataService::new().with_item(
                    ProjectItem::new(PACKAGE_REFERENCE_ITEM, "Dapper")
                        .with_metadata("Version", "2.1.28"),
                ),
            )
            .with_project_references(PATH, ["/src/Lib/Lib.csproj"]);
        let project = InMemoryProject::new("App", PATH).deferred(true);
        let handle = handle_for(project.clone(), workspace);

        let bundle = workspace_bundle(&handle).unwrap();
        let reader = bundle.references_reader().unwrap();
        assert_eq!(
            reader.package_references().unwrap(),
            vec![PackageReference::new("Dapper", Some("2.1.28".to_string()))]
        );
        assert_eq!(
            reader.project_references().unwrap(),
            vec![PathBuf::from("/src/Lib/Lib.csproj")]
        );
        assert_eq!(project.load_count(), 0);
    }

    #[test]
    fn test_missing_data_service_fails_fast() {
        let project = InMemoryProject::new("App", PATH).deferred(true);
        let handle = handle_for(project, InMemoryWorkspace::new());

        let bundle = workspace_bundle(&handle).unwrap();
        let err = bundle
            .references_reader()
            .unwrap()
            .package_references()
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingService { .. }));
    }

    #[test]
    fn test_nominates_with_explicit_restore_style() {
        let project = InMemoryProject::new("App", PATH)
            .deferred(true)
            .with_property(names::RESTORE_PROJECT_STYLE, "PackageReference");
        let handle = handle_for(project, InMemoryWorkspace::new());

        let caps = WorkspaceCapabilities::new(handle);
        assert!(caps.nominates_on_solution_load().unwrap());
    }

    #[test]
    fn test_does_not_nominate_without_references() {
        let workspace = InMemoryWorkspace::new().with_project_data(PATH, InMemoryDataService::new());
        let project = InMemoryProject::new("App", PATH).deferred(true);
        let handle = handle_for(project, workspace);

        let caps = WorkspaceCapabilities::new(handle);
        assert!(caps.supports_package_references().unwrap());
        assert!(!caps.nominates_on_solution_load().unwrap());
    }
}
