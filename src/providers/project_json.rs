//! Projects with a `project.json` manifest.

use std::sync::Arc;

use anyhow::Result;

use crate::core::framework::apply_platform_min_version;
use crate::core::handle::ProjectHandle;
use crate::core::project_system::{ProjectKind, ProjectStyle, ProjectSystem};
use crate::core::properties::names as props;
use crate::providers::context::{MessageLevel, ResolutionContext};
use crate::providers::{names, ProjectSystemProvider};
use crate::services::manifest::{find_manifest, manifest_bundle, JsonManifest};

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectJsonProvider;

impl ProjectSystemProvider for ProjectJsonProvider {
    fn name(&self) -> &str {
        names::PROJECT_JSON
    }

    fn after(&self) -> &[&str] {
        &[names::LEGACY_PACKAGE_REFERENCE]
    }

    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>> {
        let Some(path) = find_manifest(handle)? else {
            return Ok(None);
        };

        let manifest = Arc::new(JsonManifest::new(path.clone()));
        let frameworks = manifest.frameworks()?;

        // UAP projects restore against their minimum platform version.
        let derived = handle.target_framework();
        let framework = apply_platform_min_version(
            derived.clone(),
            handle
                .build_property(props::TARGET_PLATFORM_MIN_VERSION)
                .as_deref(),
        );
        if framework != derived {
            ctx.log(
                MessageLevel::Debug,
                format!(
                    "`{}` targets {} (was {})",
                    handle.name(),
                    framework,
                    derived
                ),
            );
        }

        Ok(Some(
            ProjectSystem::new(
                handle.clone(),
                ProjectStyle::ProjectJson,
                ProjectKind::ProjectJson,
                Box::new(manifest_bundle(handle, manifest)?),
            )
            .with_target_framework(framework)
            .with_frameworks(frameworks)
            .with_manifest_path(path),
        ))
    }
}
