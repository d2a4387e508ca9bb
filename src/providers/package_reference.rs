//! Package-reference projects that are still deferred.
//!
//! The project system fronts a [`DeferredServiceProxy`]: reads are served by
//! the deferred workspace until the project loads, and the model-backed
//! services take over from then on.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::handle::ProjectHandle;
use crate::core::project_system::{ProjectKind, ProjectStyle, ProjectSystem};
use crate::providers::context::ResolutionContext;
use crate::providers::{names, ProjectSystemProvider};
use crate::services::managed::managed_bundle;
use crate::services::manifest::{named_manifest, PROJECT_JSON};
use crate::services::workspace::{require_data_service, workspace_bundle};
use crate::services::DeferredServiceProxy;

/// `packages.config` next to the project.
pub const PACKAGES_CONFIG: &str = "packages.config";

/// Files that mark a project as owned by the packages.config or json
/// manifest representations.
fn legacy_markers(project_name: &str) -> [String; 4] {
    [
        PACKAGES_CONFIG.to_string(),
        format!("packages.{}.config", project_name),
        PROJECT_JSON.to_string(),
        named_manifest(project_name),
    ]
}

/// Whether a marker exists in the workspace view or on disk.
fn has_legacy_marker(handle: &ProjectHandle, dir: &Path) -> Result<bool> {
    for marker in legacy_markers(handle.name()) {
        let path = dir.join(&marker);
        if handle.entity_exists(&path)? || path.exists() {
            tracing::debug!("`{}` has {}", handle.name(), marker);
            return Ok(true);
        }
    }
    Ok(false)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PackageReferenceProvider;

impl ProjectSystemProvider for PackageReferenceProvider {
    fn name(&self) -> &str {
        names::PACKAGE_REFERENCE
    }

    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        _ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>> {
        if !handle
            .project_types()?
            .is_deferred_package_reference_capable()
        {
            return Ok(None);
        }

        // Loaded projects belong to the legacy provider.
        if !handle.is_deferred()? {
            return Ok(None);
        }

        let opted_in = handle
            .restore_style()
            .is_some_and(|s| s.is_package_reference());
        if !opted_in && has_legacy_marker(handle, &handle.full_path()?)? {
            return Ok(None);
        }

        require_data_service(handle).with_context(|| {
            format!("deferred project `{}` has no workspace data", handle.name())
        })?;

        let fallback_handle = handle.clone();
        let proxy = DeferredServiceProxy::new(
            handle.clone(),
            workspace_bundle(handle)?,
            Box::new(move || managed_bundle(&fallback_handle)),
        );

        Ok(Some(
            ProjectSystem::new(
                handle.clone(),
                ProjectStyle::PackageReference,
                ProjectKind::PackageReference,
                Box::new(proxy),
            )
            .with_target_framework(handle.target_framework())
            .with_frameworks(handle.target_frameworks()),
        ))
    }
}
