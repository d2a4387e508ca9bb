//! Classic MSBuild projects using `packages.config`.
//!
//! The universal fallback: it accepts every project that reaches it and picks
//! a sub-representation from the project's classifiers.

use std::sync::Arc;

use anyhow::Result;

use crate::core::handle::ProjectHandle;
use crate::core::project_system::{MsBuildFlavor, ProjectKind, ProjectStyle, ProjectSystem};
use crate::core::project_type::{ProjectType, ProjectTypes};
use crate::providers::context::ResolutionContext;
use crate::providers::{names, ProjectSystemProvider};
use crate::services::classic::classic_bundle;
use crate::services::workspace::classic_workspace_bundle;
use crate::services::{DeferredServiceProxy, ProjectServices};

/// Sub-representation for one classifier.
fn flavor_of(ty: &ProjectType) -> Option<MsBuildFlavor> {
    match ty {
        ProjectType::WebApplication => Some(MsBuildFlavor::WebApplication),
        ProjectType::WebSite => Some(MsBuildFlavor::WebSite),
        ProjectType::FSharp => Some(MsBuildFlavor::FSharp),
        ProjectType::Wix | ProjectType::Deployment => Some(MsBuildFlavor::Installer),
        ProjectType::JavaScript => Some(MsBuildFlavor::JavaScript),
        ProjectType::WindowsStore => Some(MsBuildFlavor::WindowsStore),
        _ => None,
    }
}

/// Pick the sub-representation for a classifier set.
///
/// Native projects often carry other tags too, so they are checked first.
pub fn select_flavor(types: &ProjectTypes) -> MsBuildFlavor {
    if types.is_native() {
        return MsBuildFlavor::Native;
    }
    types
        .iter()
        .find_map(flavor_of)
        .unwrap_or(MsBuildFlavor::Generic)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MsBuildProvider;

impl ProjectSystemProvider for MsBuildProvider {
    fn name(&self) -> &str {
        names::MSBUILD
    }

    fn after(&self) -> &[&str] {
        &[names::PROJECT_JSON]
    }

    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>> {
        let flavor = select_flavor(handle.project_types()?);
        let packages_path = ctx.packages_path()?;

        let services: Box<dyn ProjectServices> = if handle.is_deferred()? {
            let fallback_handle = handle.clone();
            Box::new(DeferredServiceProxy::new(
                handle.clone(),
                classic_workspace_bundle(handle)?,
                Box::new(move || classic_bundle(&fallback_handle)),
            ))
        } else {
            Box::new(classic_bundle(handle)?)
        };

        tracing::debug!("`{}` is a {} msbuild project", handle.name(), flavor.as_str());
        Ok(Some(
            ProjectSystem::new(
                handle.clone(),
                ProjectStyle::PackagesConfig,
                ProjectKind::MsBuild(flavor),
                services,
            )
            .with_target_framework(handle.target_framework())
            .with_frameworks(handle.target_frameworks())
            .with_packages_path(packages_path),
        ))
    }
}
