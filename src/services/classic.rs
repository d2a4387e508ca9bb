//! Services shared by classic (non package-reference) representations.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::handle::ProjectHandle;
use crate::core::host::ProjectModel;
use crate::services::managed::ModelReferencesReader;
use crate::services::{BuildSystemAccessor, ProjectCapabilities, ServiceBundle, ServiceError};

/// Services of a loaded packages.config project.
///
/// Package edits go through the install pipeline, so the writer slot stays
/// unbound.
pub fn classic_bundle(handle: &Arc<ProjectHandle>) -> Result<ServiceBundle, ServiceError> {
    let model = handle.project_model()?;

    let mut bundle = ServiceBundle::new();
    bundle.bind_capabilities(Arc::new(StaticCapabilities::packages_config()))?;
    bundle.bind_references_reader(Arc::new(ModelReferencesReader::new(model)))?;
    bundle.bind_build_system(Arc::new(HandleBuildSystem::new(handle.clone())))?;
    Ok(bundle)
}

/// Capability flags fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct StaticCapabilities {
    pub supports_package_references: bool,
    pub nominates_on_solution_load: bool,
}

impl StaticCapabilities {
    /// Flags for `packages.config` and json-manifest projects.
    pub fn packages_config() -> Self {
        StaticCapabilities {
            supports_package_references: false,
            nominates_on_solution_load: false,
        }
    }
}

impl ProjectCapabilities for StaticCapabilities {
    fn supports_package_references(&self) -> Result<bool, ServiceError> {
        Ok(self.supports_package_references)
    }

    fn nominates_on_solution_load(&self) -> Result<bool, ServiceError> {
        Ok(self.nominates_on_solution_load)
    }
}

/// Build-system access routed through the project handle.
///
/// The live model is only materialised when [`BuildSystemAccessor::project_model`]
/// is called.
pub struct HandleBuildSystem {
    handle: Arc<ProjectHandle>,
}

impl HandleBuildSystem {
    pub fn new(handle: Arc<ProjectHandle>) -> Self {
        HandleBuildSystem { handle }
    }
}

impl BuildSystemAccessor for HandleBuildSystem {
    fn project_file(&self) -> Result<PathBuf, ServiceError> {
        Ok(self.handle.full_project_path()?)
    }

    fn property(&self, name: &str) -> Option<String> {
        self.handle.build_property(name)
    }

    fn project_model(&self) -> Result<Arc<dyn ProjectModel>, ServiceError> {
        self.handle.project_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
    use crate::services::{ProjectServices, ServiceKind};
    use crate::test_support::handle_for;

    #[test]
    fn test_handle_build_system_is_lazy() {
        let project = InMemoryProject::new("Lib", "/src/Lib/Lib.csproj")
            .deferred(true)
            .with_property("Configuration", "Debug");
        let handle = handle_for(project.clone(), InMemoryWorkspace::new());
        let build_system = HandleBuildSystem::new(handle);

        assert_eq!(
            build_system.project_file().unwrap(),
            PathBuf::from("/src/Lib/Lib.csproj")
        );
        assert_eq!(build_system.property("Configuration"), Some("Debug".to_string()));
        assert_eq!(project.load_count(), 0);

        build_system.project_model().unwrap();
        assert_eq!(project.load_count(), 1);
    }

    #[test]
    fn test_classic_bundle_leaves_writer_unbound() {
        let project = InMemoryProject::new("Lib", "/src/Lib/Lib.csproj")
            .with_project_reference("/src/Core/Core.csproj");
        let handle = handle_for(project, InMemoryWorkspace::new());

        let bundle = classic_bundle(&handle).unwrap();
        assert!(!bundle.is_bound(ServiceKind::ReferencesWriter));
        assert_eq!(
            bundle.references_reader().unwrap().project_references().unwrap(),
            vec![PathBuf::from("/src/Core/Core.csproj")]
        );
    }
}
