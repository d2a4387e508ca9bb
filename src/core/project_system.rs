//! The resolved project representation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::framework::FrameworkName;
use crate::core::handle::ProjectHandle;
use crate::services::{
    BuildSystemAccessor, PackageReference, ProjectCapabilities, ProjectServices,
    ReferencesReader, ReferencesWriter, ServiceError,
};

/// How a project declares its packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStyle {
    /// `packages.config` next to the project.
    PackagesConfig,
    /// `PackageReference` items in the project file.
    PackageReference,
    /// A `project.json` manifest.
    ProjectJson,
}

impl ProjectStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStyle::PackagesConfig => "packages.config",
            ProjectStyle::PackageReference => "PackageReference",
            ProjectStyle::ProjectJson => "project.json",
        }
    }
}

impl fmt::Display for ProjectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-representations of classic MSBuild projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsBuildFlavor {
    Generic,
    WebApplication,
    WebSite,
    FSharp,
    Installer,
    JavaScript,
    WindowsStore,
    Native,
}

impl MsBuildFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MsBuildFlavor::Generic => "generic",
            MsBuildFlavor::WebApplication => "web application",
            MsBuildFlavor::WebSite => "web site",
            MsBuildFlavor::FSharp => "F#",
            MsBuildFlavor::Installer => "installer",
            MsBuildFlavor::JavaScript => "JavaScript",
            MsBuildFlavor::WindowsStore => "Windows Store",
            MsBuildFlavor::Native => "native",
        }
    }
}

/// Which concrete representation a provider built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    /// Package-reference project, possibly still deferred.
    PackageReference,
    /// Loaded legacy project that opted into package references.
    LegacyPackageReference,
    ProjectJson,
    MsBuild(MsBuildFlavor),
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::PackageReference => write!(f, "package reference"),
            ProjectKind::LegacyPackageReference => write!(f, "legacy package reference"),
            ProjectKind::ProjectJson => write!(f, "project.json"),
            ProjectKind::MsBuild(flavor) => write!(f, "msbuild ({})", flavor.as_str()),
        }
    }
}

/// A project system: one project's package dependencies and the services
/// that read and edit them.
///
/// Built once by the winning provider; only lazily filled service slots
/// change afterwards.
pub struct ProjectSystem {
    handle: Arc<ProjectHandle>,
    style: ProjectStyle,
    kind: ProjectKind,
    provider: String,
    target_framework: FrameworkName,
    frameworks: Vec<String>,
    services: Box<dyn ProjectServices>,
    packages_path: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
}

impl ProjectSystem {
    pub fn new(
        handle: Arc<ProjectHandle>,
        style: ProjectStyle,
        kind: ProjectKind,
        services: Box<dyn ProjectServices>,
    ) -> Self {
        ProjectSystem {
            handle,
            style,
            kind,
            provider: String::new(),
            target_framework: FrameworkName::unsupported(),
            frameworks: Vec::new(),
            services,
            packages_path: None,
            manifest_path: None,
        }
    }

    pub fn with_target_framework(mut self, framework: FrameworkName) -> Self {
        self.target_framework = framework;
        self
    }

    pub fn with_frameworks(mut self, frameworks: Vec<String>) -> Self {
        self.frameworks = frameworks;
        self
    }

    /// Directory packages are installed into (packages.config projects).
    pub fn with_packages_path(mut self, path: PathBuf) -> Self {
        self.packages_path = Some(path);
        self
    }

    pub fn with_manifest_path(mut self, path: PathBuf) -> Self {
        self.manifest_path = Some(path);
        self
    }

    pub(crate) fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn handle(&self) -> &Arc<ProjectHandle> {
        &self.handle
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn style(&self) -> ProjectStyle {
        self.style
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    /// Name of the provider that built this representation.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn target_framework(&self) -> &FrameworkName {
        &self.target_framework
    }

    /// Every framework the project targets.
    pub fn frameworks(&self) -> &[String] {
        &self.frameworks
    }

    pub fn packages_path(&self) -> Option<&Path> {
        self.packages_path.as_deref()
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn services(&self) -> &dyn ProjectServices {
        self.services.as_ref()
    }

    // =========================================================================
    // Service shortcuts
    // =========================================================================

    pub fn capabilities(&self) -> Result<&dyn ProjectCapabilities, ServiceError> {
        self.services.capabilities()
    }

    pub fn references_reader(&self) -> Result<&dyn ReferencesReader, ServiceError> {
        self.services.references_reader()
    }

    pub fn references_writer(&self) -> Result<&dyn ReferencesWriter, ServiceError> {
        self.services.references_writer()
    }

    pub fn build_system(&self) -> Result<&dyn BuildSystemAccessor, ServiceError> {
        self.services.build_system()
    }

    pub fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError> {
        self.references_reader()?.package_references()
    }

    pub fn add_or_update_package_reference(
        &self,
        reference: &PackageReference,
    ) -> Result<(), ServiceError> {
        self.references_writer()?
            .add_or_update_package_reference(reference)
    }

    pub fn remove_package_reference(&self, name: &str) -> Result<bool, ServiceError> {
        self.references_writer()?.remove_package_reference(name)
    }
}

impl fmt::Debug for ProjectSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectSystem")
            .field("project", &self.name())
            .field("style", &self.style)
            .field("kind", &self.kind)
            .field("provider", &self.provider)
            .field("target_framework", &self.target_framework)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
    use crate::services::classic::StaticCapabilities;
    use crate::services::{ServiceBundle, ServiceKind};
    use crate::test_support::handle_for;

    #[test]
    fn test_unbound_writer_fails_loudly() {
        let handle = handle_for(
            InMemoryProject::new("App", "/src/App/App.csproj"),
            InMemoryWorkspace::new(),
        );
        let mut bundle = ServiceBundle::new();
        bundle
            .bind_capabilities(Arc::new(StaticCapabilities::packages_config()))
            .unwrap();

        let system = ProjectSystem::new(
            handle,
            ProjectStyle::PackagesConfig,
            ProjectKind::MsBuild(MsBuildFlavor::Generic),
            Box::new(bundle),
        );

        assert!(!system
            .capabilities()
            .unwrap()
            .supports_package_references()
            .unwrap());
        assert!(matches!(
            system.remove_package_reference("Polly"),
            Err(ServiceError::Unbound(ServiceKind::ReferencesWriter))
        ));
        assert!(system.target_framework().is_unsupported());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            ProjectKind::MsBuild(MsBuildFlavor::WebSite).to_string(),
            "msbuild (web site)"
        );
        assert_eq!(ProjectStyle::ProjectJson.to_string(), "project.json");
    }
}
