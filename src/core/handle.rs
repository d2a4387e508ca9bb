//! Uniform read surface over loaded and deferred projects.
//!
//! A [`ProjectHandle`] answers identity, path, property and classification
//! questions without forcing a project to load. Whenever the answer depends on
//! load state, the state is asked fresh from the host:
//!
//! | Query              | Loaded                   | Deferred                     |
//! |--------------------|--------------------------|------------------------------|
//! | project file path  | live model metadata      | solution hierarchy           |
//! | type classifiers   | live model               | solution hierarchy           |
//! | `entity_exists`    | real filesystem          | deferred workspace           |
//! | project references | live model               | deferred workspace           |
//!
//! Synchronous accessors join the coordinating context; the `_async`
//! variants are for callers already inside a future.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::OnceCell;

use crate::core::framework::{derive_framework, FrameworkName, FrameworkProperties};
use crate::core::host::{DeferredWorkspace, HostProject, ProjectModel};
use crate::core::project_type::ProjectTypes;
use crate::core::properties::{names, non_empty, split_list, RestoreStyle};
use crate::services::ServiceError;
use crate::util::coordinator::Coordinator;

/// One IDE project, loaded or deferred.
pub struct ProjectHandle {
    host: Arc<dyn HostProject>,
    workspace: Arc<dyn DeferredWorkspace>,
    coordinator: Coordinator,
    /// Set once the host has reported the project as loaded.
    loaded: AtomicBool,
    types: OnceCell<ProjectTypes>,
    model: OnceCell<Arc<dyn ProjectModel>>,
}

impl ProjectHandle {
    pub fn new(
        host: Arc<dyn HostProject>,
        workspace: Arc<dyn DeferredWorkspace>,
        coordinator: Coordinator,
    ) -> Self {
        ProjectHandle {
            host,
            workspace,
            coordinator,
            loaded: AtomicBool::new(false),
            types: OnceCell::new(),
            model: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.host.name()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.host.project_id()
    }

    /// Id if known, otherwise the hierarchy project path.
    pub fn unique_name(&self) -> String {
        match self.host.project_id() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.host.hierarchy_path().display().to_string(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn workspace(&self) -> &Arc<dyn DeferredWorkspace> {
        &self.workspace
    }

    // =========================================================================
    // Load state
    // =========================================================================

    /// Whether the project is still deferred.
    ///
    /// The host is asked on every call until it first reports the project as
    /// loaded; after that the answer is always `false`.
    pub async fn is_deferred_async(&self) -> Result<bool> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(false);
        }

        let deferred = self.host.is_deferred().await?;
        if !deferred && !self.loaded.swap(true, Ordering::AcqRel) {
            tracing::debug!("project `{}` is loaded", self.name());
        }
        Ok(deferred)
    }

    pub fn is_deferred(&self) -> Result<bool> {
        self.coordinator.join(self.is_deferred_async())
    }

    /// Live project model, loading the project if it is still deferred.
    pub async fn project_model_async(&self) -> Result<Arc<dyn ProjectModel>, ServiceError> {
        if let Some(model) = self.model.get() {
            return Ok(model.clone());
        }

        tracing::debug!("materialising project model for `{}`", self.name());
        let model = self
            .host
            .load_project()
            .await?
            .ok_or_else(|| ServiceError::Unsupported {
                operation: format!("load deferred project `{}`", self.name()),
            })?;

        Ok(self.model.get_or_init(|| model).clone())
    }

    pub fn project_model(&self) -> Result<Arc<dyn ProjectModel>, ServiceError> {
        self.coordinator.join(self.project_model_async())
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Absolute path of the project file.
    pub async fn full_project_path_async(&self) -> Result<PathBuf> {
        if self.is_deferred_async().await? {
            Ok(self.host.hierarchy_path().to_path_buf())
        } else {
            Ok(self.project_model_async().await?.full_path())
        }
    }

    pub fn full_project_path(&self) -> Result<PathBuf> {
        self.coordinator.join(self.full_project_path_async())
    }

    /// Directory containing the project file.
    pub async fn full_path_async(&self) -> Result<PathBuf> {
        let file = self.full_project_path_async().await?;
        Ok(file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default())
    }

    pub fn full_path(&self) -> Result<PathBuf> {
        self.coordinator.join(self.full_path_async())
    }

    /// Project file location from solution metadata; never loads.
    pub fn hierarchy_path(&self) -> &Path {
        self.host.hierarchy_path()
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Type classifiers, read once and fixed for the handle's lifetime.
    pub fn project_types(&self) -> Result<&ProjectTypes> {
        self.types.get_or_try_init(|| {
            let guids = if self.is_deferred()? {
                self.host.hierarchy_type_guids()
            } else {
                self.project_model()?.type_guids()
            };
            let types = ProjectTypes::from_guids(guids);
            tracing::debug!("project `{}` classified as {}", self.name(), types);
            Ok::<_, anyhow::Error>(types)
        })
    }

    // =========================================================================
    // Build properties
    // =========================================================================

    /// Build property from the host. While deferred, a property the host
    /// doesn't know is asked of the workspace's data service.
    pub fn build_property(&self, name: &str) -> Option<String> {
        non_empty(self.host.build_properties().property_value(name))
            .or_else(|| self.coordinator.join(self.workspace_property(name)))
    }

    pub async fn build_property_async(&self, name: &str) -> Option<String> {
        let source = self.host.build_properties();
        match non_empty(source.property_value_async(name).await) {
            Some(value) => Some(value),
            None => self.workspace_property(name).await,
        }
    }

    async fn workspace_property(&self, name: &str) -> Option<String> {
        if !matches!(self.is_deferred_async().await, Ok(true)) {
            return None;
        }

        let path = self.host.hierarchy_path();
        let service = match self.workspace.project_data_service(path).await {
            Ok(Some(service)) => service,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("no workspace data for `{}`: {:#}", self.name(), e);
                return None;
            }
        };
        match service.property(name).await {
            Ok(value) => non_empty(value),
            Err(e) => {
                tracing::debug!("workspace property `{}` of `{}`: {:#}", name, self.name(), e);
                None
            }
        }
    }

    pub fn restore_style(&self) -> Option<RestoreStyle> {
        self.build_property(names::RESTORE_PROJECT_STYLE)
            .and_then(|v| RestoreStyle::parse(&v))
    }

    pub async fn restore_style_async(&self) -> Option<RestoreStyle> {
        self.build_property_async(names::RESTORE_PROJECT_STYLE)
            .await
            .and_then(|v| RestoreStyle::parse(&v))
    }

    /// Derive the project's framework from its build properties.
    ///
    /// Yields [`FrameworkName::unsupported`] when nothing is set.
    pub async fn target_framework_async(&self) -> FrameworkName {
        let props = FrameworkProperties {
            target_frameworks: self.build_property_async(names::TARGET_FRAMEWORKS).await,
            target_framework: self.build_property_async(names::TARGET_FRAMEWORK).await,
            target_framework_moniker: self
                .build_property_async(names::TARGET_FRAMEWORK_MONIKER)
                .await,
            target_platform_identifier: self
                .build_property_async(names::TARGET_PLATFORM_IDENTIFIER)
                .await,
            target_platform_version: self
                .build_property_async(names::TARGET_PLATFORM_VERSION)
                .await,
            target_platform_min_version: self
                .build_property_async(names::TARGET_PLATFORM_MIN_VERSION)
                .await,
            native_project: is_native_project_file(self.host.hierarchy_path()),
        };
        derive_framework(&props)
    }

    pub fn target_framework(&self) -> FrameworkName {
        self.coordinator.join(self.target_framework_async())
    }

    /// All frameworks from `TargetFrameworks`, or the single `TargetFramework`.
    pub fn target_frameworks(&self) -> Vec<String> {
        if let Some(list) = self.build_property(names::TARGET_FRAMEWORKS) {
            return split_list(&list);
        }
        self.build_property(names::TARGET_FRAMEWORK)
            .into_iter()
            .collect()
    }

    /// Union of `RuntimeIdentifier` and `RuntimeIdentifiers`, in order.
    pub fn runtime_identifiers(&self) -> Vec<String> {
        let mut rids = Vec::new();
        for name in [names::RUNTIME_IDENTIFIER, names::RUNTIME_IDENTIFIERS] {
            for rid in self
                .build_property(name)
                .map(|v| split_list(&v))
                .unwrap_or_default()
            {
                if !rids.contains(&rid) {
                    rids.push(rid);
                }
            }
        }
        rids
    }

    pub fn runtime_supports(&self) -> Vec<String> {
        self.list_property(names::RUNTIME_SUPPORTS)
    }

    pub fn package_target_fallback(&self) -> Vec<String> {
        self.list_property(names::PACKAGE_TARGET_FALLBACK)
    }

    /// `PackageVersion`, falling back to `Version`.
    pub fn package_version(&self) -> Option<String> {
        self.build_property(names::PACKAGE_VERSION)
            .or_else(|| self.build_property(names::VERSION))
    }

    /// `BaseIntermediateOutputPath`, resolved against the project directory.
    pub fn base_intermediate_path(&self) -> Result<Option<PathBuf>> {
        let Some(value) = self.build_property(names::BASE_INTERMEDIATE_OUTPUT_PATH) else {
            return Ok(None);
        };
        Ok(Some(self.full_path()?.join(value)))
    }

    fn list_property(&self, name: &str) -> Vec<String> {
        self.build_property(name)
            .map(|v| split_list(&v))
            .unwrap_or_default()
    }

    // =========================================================================
    // Files and references
    // =========================================================================

    /// Whether a file exists from the project's point of view.
    ///
    /// Deferred projects ask the workspace, whose logical view may contain
    /// files not yet written to disk. Loaded projects ask the filesystem.
    /// Relative paths are resolved against the project directory.
    pub async fn entity_exists_async(&self, path: &Path) -> Result<bool> {
        let deferred = self.is_deferred_async().await?;
        let path = if path.is_relative() {
            self.full_path_async().await?.join(path)
        } else {
            path.to_path_buf()
        };

        if deferred {
            self.workspace.entity_exists(&path).await
        } else {
            Ok(path.exists())
        }
    }

    pub fn entity_exists(&self, path: &Path) -> Result<bool> {
        self.coordinator.join(self.entity_exists_async(path))
    }

    /// Project files this project references.
    pub async fn project_references_async(&self) -> Result<Vec<PathBuf>> {
        if self.is_deferred_async().await? {
            self.workspace
                .project_references(self.host.hierarchy_path())
                .await
        } else {
            Ok(self.project_model_async().await?.project_references())
        }
    }

    pub fn project_references(&self) -> Result<Vec<PathBuf>> {
        self.coordinator.join(self.project_references_async())
    }
}

impl std::fmt::Debug for ProjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectHandle")
            .field("name", &self.name())
            .field("path", &self.host.hierarchy_path())
            .finish()
    }
}

fn is_native_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("vcxproj"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project_type::{guids, ProjectType};
    use crate::host::memory::{InMemoryDataService, InMemoryProject, InMemoryWorkspace};
    use crate::test_support::handle_for;

    #[test]
    fn test_deferred_paths_come_from_hierarchy() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj").deferred(true);
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert!(handle.is_deferred().unwrap());
        assert_eq!(
            handle.full_project_path().unwrap(),
            PathBuf::from("/src/App/App.csproj")
        );
        assert_eq!(handle.full_path().unwrap(), PathBuf::from("/src/App"));
    }

    #[test]
    fn test_loaded_paths_come_from_model() {
        let project = InMemoryProject::new("App", "/stale/App.csproj")
            .with_loaded_path("/src/App/App.csproj");
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert!(!handle.is_deferred().unwrap());
        assert_eq!(handle.full_path().unwrap(), PathBuf::from("/src/App"));
    }

    #[test]
    fn test_deferred_flag_is_read_per_call() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj").deferred(true);
        let handle = handle_for(project.clone(), InMemoryWorkspace::new());

        assert!(handle.is_deferred().unwrap());
        project.finish_loading();
        assert!(!handle.is_deferred().unwrap());
    }

    #[test]
    fn test_deferred_flag_never_returns_to_true() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj");
        let handle = handle_for(project.clone(), InMemoryWorkspace::new());

        assert!(!handle.is_deferred().unwrap());
        project.set_deferred(true);
        assert!(!handle.is_deferred().unwrap());
    }

    #[test]
    fn test_classifiers_fixed_after_first_read() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .deferred(true)
            .with_type_guids([guids::CSHARP]);
        let handle = handle_for(project.clone(), InMemoryWorkspace::new());

        assert!(handle
            .project_types()
            .unwrap()
            .contains(&ProjectType::CSharp));

        project.finish_loading();
        project.set_type_guids([guids::NATIVE_CPP]);
        let types = handle.project_types().unwrap();
        assert!(types.contains(&ProjectType::CSharp));
        assert!(!types.is_native());
    }

    #[test]
    fn test_target_framework_sentinel_without_properties() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj");
        let handle = handle_for(project, InMemoryWorkspace::new());
        assert!(handle.target_framework().is_unsupported());
    }

    #[test]
    fn test_target_framework_from_moniker() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj").with_property(
            names::TARGET_FRAMEWORK_MONIKER,
            ".NETFramework,Version=v4.7.2",
        );
        let handle = handle_for(project, InMemoryWorkspace::new());
        assert_eq!(
            handle.target_framework().as_str(),
            ".NETFramework,Version=v4.7.2"
        );
    }

    #[test]
    fn test_entity_exists_deferred_uses_workspace() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project_file = tmp.path().join("App.csproj");
        let on_disk = tmp.path().join("on-disk.txt");
        std::fs::write(&on_disk, "x").unwrap();
        let logical = tmp.path().join("logical.txt");

        let workspace = InMemoryWorkspace::new().with_file(&logical);
        let project = InMemoryProject::new("App", &project_file).deferred(true);
        let handle = handle_for(project, workspace);

        assert!(handle.entity_exists(&logical).unwrap());
        assert!(!handle.entity_exists(&on_disk).unwrap());
    }

    #[test]
    fn test_entity_exists_loaded_uses_filesystem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project_file = tmp.path().join("App.csproj");
        std::fs::write(tmp.path().join("on-disk.txt"), "x").unwrap();
        let logical = tmp.path().join("logical.txt");

        let workspace = InMemoryWorkspace::new().with_file(&logical);
        let project = InMemoryProject::new("App", &project_file);
        let handle = handle_for(project, workspace);

        assert!(handle.entity_exists(Path::new("on-disk.txt")).unwrap());
        assert!(!handle.entity_exists(&logical).unwrap());
    }

    #[test]
    fn test_runtime_identifiers_union() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .with_property(names::RUNTIME_IDENTIFIER, "win-x64")
            .with_property(names::RUNTIME_IDENTIFIERS, "win-x64;linux-x64");
        let handle = handle_for(project, InMemoryWorkspace::new());
        assert_eq!(
            handle.runtime_identifiers(),
            vec!["win-x64".to_string(), "linux-x64".to_string()]
        );
    }

    #[test]
    fn test_package_version_falls_back_to_version() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .with_property(names::VERSION, "2.1.0");
        let handle = handle_for(project, InMemoryWorkspace::new());
        assert_eq!(handle.package_version(), Some("2.1.0".to_string()));
    }

    #[test]
    fn test_unique_name_prefers_id() {
        let with_id = InMemoryProject::new("App", "/src/App/App.csproj").with_id("{A1B2}");
        let handle = handle_for(with_id, InMemoryWorkspace::new());
        assert_eq!(handle.unique_name(), "{A1B2}");

        let without_id = InMemoryProject::new("App", "/src/App/App.csproj");
        let handle = handle_for(without_id, InMemoryWorkspace::new());
        assert_eq!(handle.unique_name(), "/src/App/App.csproj");
    }

    #[test]
    fn test_list_properties() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .with_property(names::RUNTIME_SUPPORTS, "win10-x64; win10-x86")
            .with_property(names::PACKAGE_TARGET_FALLBACK, "portable-net45+win8;dnxcore50");
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert_eq!(handle.runtime_supports(), vec!["win10-x64", "win10-x86"]);
        assert_eq!(
            handle.package_target_fallback(),
            vec!["portable-net45+win8", "dnxcore50"]
        );
    }

    #[test]
    fn test_list_properties_empty_when_unset() {
        let handle = handle_for(
            InMemoryProject::new("App", "/src/App/App.csproj"),
            InMemoryWorkspace::new(),
        );
        assert!(handle.runtime_supports().is_empty());
        assert!(handle.package_target_fallback().is_empty());
        assert_eq!(handle.base_intermediate_path().unwrap(), None);
    }

    #[test]
    fn test_base_intermediate_path_deferred() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .deferred(true)
            .with_property(names::BASE_INTERMEDIATE_OUTPUT_PATH, "obj");
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert_eq!(
            handle.base_intermediate_path().unwrap(),
            Some(PathBuf::from("/src/App/obj"))
        );
    }

    #[test]
    fn test_base_intermediate_path_loaded() {
        let project = InMemoryProject::new("App", "/stale/App.csproj")
            .with_loaded_path("/src/App/App.csproj")
            .with_property(names::BASE_INTERMEDIATE_OUTPUT_PATH, "build/obj");
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert_eq!(
            handle.base_intermediate_path().unwrap(),
            Some(PathBuf::from("/src/App/build/obj"))
        );
    }

    #[test]
    fn test_deferred_property_read_from_workspace() {
        let workspace = InMemoryWorkspace::new().with_project_data(
            "/src/App/App.csproj",
            InMemoryDataService::new()
                .with_property(names::TARGET_FRAMEWORK_MONIKER, ".NETCoreApp,Version=v8.0"),
        );
        let project = InMemoryProject::new("App", "/src/App/App.csproj").deferred(true);
        let handle = handle_for(project.clone(), workspace);

        assert_eq!(
            handle.build_property(names::TARGET_FRAMEWORK_MONIKER).as_deref(),
            Some(".NETCoreApp,Version=v8.0")
        );
        assert_eq!(handle.target_framework().as_str(), ".NETCoreApp,Version=v8.0");

        // Once loaded, only the host's properties count.
        project.finish_loading();
        assert_eq!(handle.build_property(names::TARGET_FRAMEWORK_MONIKER), None);
        assert!(handle.target_framework().is_unsupported());
    }

    #[test]
    fn test_host_property_wins_over_workspace() {
        let workspace = InMemoryWorkspace::new().with_project_data(
            "/src/App/App.csproj",
            InMemoryDataService::new().with_property(names::TARGET_FRAMEWORK, "net6.0"),
        );
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .deferred(true)
            .with_property(names::TARGET_FRAMEWORK, "net8.0");
        let handle = handle_for(project, workspace.clone());

        assert_eq!(
            handle.build_property(names::TARGET_FRAMEWORK).as_deref(),
            Some("net8.0")
        );
        assert_eq!(workspace.query_count(), 0);
    }

    #[test]
    fn test_unloadable_deferred_project_is_unsupported() {
        let project = InMemoryProject::new("App", "/src/App/App.csproj")
            .deferred(true)
            .loadable(false);
        let handle = handle_for(project, InMemoryWorkspace::new());

        let err = handle.project_model().err().unwrap();
        assert!(matches!(err, ServiceError::Unsupported { .. }));
    }
}
