//! Services backed by the live model of a loaded project.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::handle::ProjectHandle;
use crate::core::host::{
    ProjectItem, ProjectModel, PACKAGE_REFERENCES_CAPABILITY, PACKAGE_REFERENCE_ITEM,
};
use crate::services::classic::HandleBuildSystem;
use crate::services::{
    PackageReference, ProjectCapabilities, ReferencesReader, ReferencesWriter, ServiceBundle,
    ServiceError,
};

const VERSION_METADATA: &str = "Version";

/// Convert a `PackageReference` item into a reference.
pub(crate) fn reference_from_item(item: &ProjectItem) -> PackageReference {
    let version = item
        .metadata(VERSION_METADATA)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    PackageReference::new(item.include.clone(), version)
}

/// Build the full service bundle for a loaded managed project.
///
/// Loads the project if it is still deferred.
pub fn managed_bundle(handle: &Arc<ProjectHandle>) -> Result<ServiceBundle, ServiceError> {
    let model = handle.project_model()?;

    let mut bundle = ServiceBundle::new();
    bundle.bind_capabilities(Arc::new(ManagedCapabilities::new(model.clone())))?;
    bundle.bind_references_reader(Arc::new(ModelReferencesReader::new(model.clone())))?;
    bundle.bind_references_writer(Arc::new(ModelReferencesWriter::new(model)))?;
    bundle.bind_build_system(Arc::new(HandleBuildSystem::new(handle.clone())))?;
    Ok(bundle)
}

/// Capability flags read from the live model.
pub struct ManagedCapabilities {
    model: Arc<dyn ProjectModel>,
}

impl ManagedCapabilities {
    pub fn new(model: Arc<dyn ProjectModel>) -> Self {
        ManagedCapabilities { model }
    }
}

impl ProjectCapabilities for ManagedCapabilities {
    fn supports_package_references(&self) -> Result<bool, ServiceError> {
        Ok(self.model.has_capability(PACKAGE_REFERENCES_CAPABILITY))
    }

    fn nominates_on_solution_load(&self) -> Result<bool, ServiceError> {
        self.supports_package_references()
    }
}

/// Reads `PackageReference` items and project references from the model.
pub struct ModelReferencesReader {
    model: Arc<dyn ProjectModel>,
}

impl ModelReferencesReader {
    pub fn new(model: Arc<dyn ProjectModel>) -> Self {
        ModelReferencesReader { model }
    }
}

impl ReferencesReader for ModelReferencesReader {
    fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError> {
        Ok(self
            .model
            .items(PACKAGE_REFERENCE_ITEM)
            .iter()
            .map(reference_from_item)
            .collect())
    }

    fn project_references(&self) -> Result<Vec<PathBuf>, ServiceError> {
        Ok(self.model.project_references())
    }
}

/// Edits `PackageReference` items in the model.
pub struct ModelReferencesWriter {
    model: Arc<dyn ProjectModel>,
}

impl ModelReferencesWriter {
    pub fn new(model: Arc<dyn ProjectModel>) -> Self {
        ModelReferencesWriter { model }
    }
}

impl ReferencesWriter for ModelReferencesWriter {
    fn add_or_update_package_reference(
        &self,
        reference: &PackageReference,
    ) -> Result<(), ServiceError> {
        let mut item = ProjectItem::new(PACKAGE_REFERENCE_ITEM, reference.name.clone());
        if let Some(version) = &reference.version {
            item = item.with_metadata(VERSION_METADATA, version.clone());
        }

        tracing::debug!("writing package reference {}", reference);
        self.model.upsert_item(item)?;
        Ok(())
    }

    fn remove_package_reference(&self, name: &str) -> Result<bool, ServiceError> {
        let removed = self.model.remove_item(PACKAGE_REFERENCE_ITEM, name)?;
        if removed {
            tracing::debug!("removed package reference {}", name);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
    use crate::services::ProjectServices;
    use crate::test_support::handle_for;

    fn project() -> InMemoryProject {
        InMemoryProject::new("App", "/src/App/App.csproj")
            .with_capability(PACKAGE_REFERENCES_CAPABILITY)
            .with_item(
                ProjectItem::new(PACKAGE_REFERENCE_ITEM, "Serilog").with_metadata("Version", "3.1.1"),
            )
            .with_project_reference("/src/Lib/Lib.csproj")
    }

    #[test]
    fn test_bundle_binds_every_kind() {
        let handle = handle_for(project(), InMemoryWorkspace::new());
        let bundle = managed_bundle(&handle).unwrap();
        assert_eq!(bundle.bound_kinds().len(), 4);
        assert!(bundle
            .capabilities()
            .unwrap()
            .supports_package_references()
            .unwrap());
    }

    #[test]
    fn test_reader() {
        let handle = handle_for(project(), InMemoryWorkspace::new());
        let bundle = managed_bundle(&handle).unwrap();
        let reader = bundle.references_reader().unwrap();

        assert_eq!(
            reader.package_references().unwrap(),
            vec![PackageReference::new("Serilog", Some("3.1.1".to_string()))]
        );
        assert_eq!(
            reader.project_references().unwrap(),
            vec![PathBuf::from("/src/Lib/Lib.csproj")]
        );
    }

    #[test]
    fn test_writer_updates_and_removes() {
        let handle = handle_for(project(), InMemoryWorkspace::new());
        let bundle = managed_bundle(&handle).unwrap();
        let writer = bundle.references_writer().unwrap();

        writer
            .add_or_update_package_reference(&PackageReference::new(
                "Serilog",
                Some("4.0.0".to_string()),
            ))
            .unwrap();
        writer
            .add_or_update_package_reference(&PackageReference::new("Polly", None))
            .unwrap();

        let refs = bundle.references_reader().unwrap().package_references().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].version.as_deref(), Some("4.0.0"));
        assert_eq!(refs[1], PackageReference::new("Polly", None));

        assert!(writer.remove_package_reference("polly").unwrap());
        assert!(!writer.remove_package_reference("polly").unwrap());
    }
}
