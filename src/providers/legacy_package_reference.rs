//! Loaded legacy projects that use package references.
//!
//! A legacy project qualifies when its model can edit package references
//! and it either opts in through `RestoreProjectStyle` or already carries
//! `PackageReference` items. The second condition covers projects migrated
//! by tools that never set the property.

use std::sync::Arc;

use anyhow::Result;

use crate::core::handle::ProjectHandle;
use crate::core::host::{PACKAGE_REFERENCES_CAPABILITY, PACKAGE_REFERENCE_ITEM};
use crate::core::project_system::{ProjectKind, ProjectStyle, ProjectSystem};
use crate::providers::context::ResolutionContext;
use crate::providers::{names, ProjectSystemProvider};
use crate::services::managed::managed_bundle;

#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyPackageReferenceProvider;

impl ProjectSystemProvider for LegacyPackageReferenceProvider {
    fn name(&self) -> &str {
        names::LEGACY_PACKAGE_REFERENCE
    }

    fn after(&self) -> &[&str] {
        &[names::PACKAGE_REFERENCE]
    }

    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        _ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>> {
        if handle.is_deferred()? || handle.project_types()?.is_native() {
            return Ok(None);
        }

        let model = handle.project_model()?;
        if !model.has_capability(PACKAGE_REFERENCES_CAPABILITY) {
            return Ok(None);
        }

        let opted_in = handle
            .restore_style()
            .is_some_and(|s| s.is_package_reference());
        if !opted_in && model.items(PACKAGE_REFERENCE_ITEM).is_empty() {
            return Ok(None);
        }

        Ok(Some(
            ProjectSystem::new(
                handle.clone(),
                ProjectStyle::PackageReference,
                ProjectKind::LegacyPackageReference,
                Box::new(managed_bundle(handle)?),
            )
            .with_target_framework(handle.target_framework())
            .with_frameworks(handle.target_frameworks()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::ProjectItem;
    use crate::core::project_type::guids;
    use crate::core::properties::names as props;
    use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
    use crate::services::PackageReference;
    use crate::test_support::{handle_for, test_context};

    fn project() -> InMemoryProject {
        InMemoryProject::new("Legacy", "/src/Legacy/Legacy.csproj")
            .with_type_guids([guids::CSHARP])
            .with_capability(PACKAGE_REFERENCES_CAPABILITY)
            .with_property(props::TARGET_FRAMEWORK_MONIKER, ".NETFramework,Version=v4.7.2")
    }

    fn probe(project: InMemoryProject) -> Option<ProjectSystem> {
        let handle = handle_for(project, InMemoryWorkspace::new());
        LegacyPackageReferenceProvider
            .try_create(&handle, &test_context())
            .unwrap()
    }

    #[test]
    fn test_accepts_explicit_opt_in() {
        let system =
            probe(project().with_property(props::RESTORE_PROJECT_STYLE, "PackageReference")).unwrap();
        assert_eq!(system.kind(), ProjectKind::LegacyPackageReference);
        assert_eq!(
            system.target_framework().as_str(),
            ".NETFramework,Version=v4.7.2"
        );
    }

    #[test]
    fn test_accepts_existing_reference_without_property() {
        let system = probe(
            project().with_item(
                ProjectItem::new(PACKAGE_REFERENCE_ITEM, "Newtonsoft.Json")
                    .with_metadata("Version", "13.0.3"),
            ),
        )
        .unwrap();
        assert_eq!(
            system.package_references().unwrap(),
            vec![PackageReference::new("Newtonsoft.Json", Some("13.0.3".to_string()))]
        );
    }

    #[test]
    fn test_declines_without_either_condition() {
        assert!(probe(project()).is_none());
    }

    #[test]
    fn test_declines_without_capability() {
        let project = InMemoryProject::new("Legacy", "/src/Legacy/Legacy.csproj")
            .with_type_guids([guids::CSHARP])
            .with_property(props::RESTORE_PROJECT_STYLE, "PackageReference");
        assert!(probe(project).is_none());
    }

    #[test]
    fn test_declines_deferred_and_native() {
        let opted_in = || project().with_property(props::RESTORE_PROJECT_STYLE, "PackageReference");

        let deferred = opted_in().deferred(true);
        assert!(probe(deferred.clone()).is_none());
        assert_eq!(deferred.load_count(), 0);

        assert!(probe(opted_in().with_type_guids([guids::NATIVE_CPP])).is_none());
    }
}
