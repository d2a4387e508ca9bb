//! `project.json` manifests.
//!
//! A json-manifest project declares its packages in a `dependencies` table
//! and its target frameworks as the keys of a `frameworks` table:
//!
//! ```json
//! {
//!   "dependencies": {
//!     "Newtonsoft.Json": "13.0.3",
//!     "Polly": { "version": "8.2.0", "type": "build" }
//!   },
//!   "frameworks": { "uap10.0": {} }
//! }
//! ```
//!
//! The file is read on every query and rewritten in place on edits, keeping
//! the existing key order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::core::handle::ProjectHandle;
use crate::services::classic::{HandleBuildSystem, StaticCapabilities};
use crate::services::{
    PackageReference, ReferencesReader, ReferencesWriter, ServiceBundle, ServiceError,
};

/// Manifest name shared by every project in a directory.
pub const PROJECT_JSON: &str = "project.json";

const DEPENDENCIES: &str = "dependencies";
const FRAMEWORKS: &str = "frameworks";
const VERSION: &str = "version";

/// `<name>.project.json`, which takes precedence over `project.json`.
pub fn named_manifest(project_name: &str) -> String {
    format!("{}.project.json", project_name)
}

/// Locate the manifest next to a project, as the project sees it.
///
/// Deferred projects are checked against the workspace, loaded projects
/// against the filesystem.
pub fn find_manifest(handle: &ProjectHandle) -> Result<Option<PathBuf>> {
    let dir = handle.full_path()?;
    for name in [named_manifest(handle.name()), PROJECT_JSON.to_string()] {
        let candidate = dir.join(&name);
        if handle.entity_exists(&candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// A `project.json` file on disk.
#[derive(Debug, Clone)]
pub struct JsonManifest {
    path: PathBuf,
}

impl JsonManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonManifest { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read manifest: {}", self.path.display()))?;
        match serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?
        {
            Value::Object(root) => Ok(root),
            _ => anyhow::bail!("{} is not a JSON object", self.path.display()),
        }
    }

    fn save(&self, root: Map<String, Value>) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&Value::Object(root))?;
        content.push('\n');
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write manifest: {}", self.path.display()))
    }

    /// Declared dependencies, in file order.
    pub fn dependencies(&self) -> Result<Vec<PackageReference>> {
        let root = self.load()?;
        let Some(deps) = root.get(DEPENDENCIES).and_then(Value::as_object) else {
            return Ok(Vec::new());
        };

        Ok(deps
            .iter()
            .map(|(name, spec)| {
                let version = match spec {
                    Value::String(v) => Some(v.as_str()),
                    Value::Object(o) => o.get(VERSION).and_then(Value::as_str),
                    _ => None,
                }
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
                PackageReference::new(name.clone(), version)
            })
            .collect())
    }

    /// Framework names, in file order.
    pub fn frameworks(&self) -> Result<Vec<String>> {
        let root = self.load()?;
        Ok(root
            .get(FRAMEWORKS)
            .and_then(Value::as_object)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Add a dependency or update its version. Names match case-insensitively.
    pub fn set_dependency(&self, reference: &PackageReference) -> Result<()> {
        let mut root = self.load()?;
        let deps = root
            .entry(DEPENDENCIES)
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(deps) = deps else {
            anyhow::bail!("`{}` in {} is not an object", DEPENDENCIES, self.path.display());
        };

        let key = deps
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&reference.name))
            .cloned()
            .unwrap_or_else(|| reference.name.clone());

        // Keep extra fields of the object form.
        if let Some(Value::Object(spec)) = deps.get_mut(&key) {
            match &reference.version {
                Some(v) => {
                    spec.insert(VERSION.to_string(), Value::String(v.clone()));
                }
                None => {
                    spec.remove(VERSION);
                }
            }
        } else {
            let spec = match &reference.version {
                Some(v) => Value::String(v.clone()),
                None => Value::Object(Map::new()),
            };
            deps.insert(key, spec);
        }

        self.save(root)
    }

    /// Remove a dependency. Returns `false` when it wasn't declared.
    pub fn remove_dependency(&self, name: &str) -> Result<bool> {
        let mut root = self.load()?;
        let Some(Value::Object(deps)) = root.get_mut(DEPENDENCIES) else {
            return Ok(false);
        };
        let Some(key) = deps.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned() else {
            return Ok(false);
        };

        deps.shift_remove(&key);
        self.save(root)?;
        Ok(true)
    }
}

/// Full service bundle for a json-manifest project.
pub fn manifest_bundle(
    handle: &Arc<ProjectHandle>,
    manifest: Arc<JsonManifest>,
) -> Result<ServiceBundle, ServiceError> {
    let mut bundle = ServiceBundle::new();
    bundle.bind_capabilities(Arc::new(StaticCapabilities::packages_config()))?;
    bundle.bind_references_reader(Arc::new(ManifestReferencesReader {
        handle: handle.clone(),
        manifest: manifest.clone(),
    }))?;
    bundle.bind_references_writer(Arc::new(ManifestReferencesWriter { manifest }))?;
    bundle.bind_build_system(Arc::new(HandleBuildSystem::new(handle.clone())))?;
    Ok(bundle)
}

/// Package references from the manifest, project references from the handle.
pub struct ManifestReferencesReader {
    handle: Arc<ProjectHandle>,
    manifest: Arc<JsonManifest>,
}

impl ReferencesReader for ManifestReferencesReader {
    fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError> {
        Ok(self.manifest.dependencies()?)
    }

    fn project_references(&self) -> Result<Vec<PathBuf>, ServiceError> {
        Ok(self.handle.project_references()?)
    }
}

pub struct ManifestReferencesWriter {
    manifest: Arc<JsonManifest>,
}

impl ReferencesWriter for ManifestReferencesWriter {
    fn add_or_update_package_reference(
        &self,
        reference: &PackageReference,
    ) -> Result<(), ServiceError> {
        tracing::debug!(
            "writing {} to {}",
            reference,
            self.manifest.path().display()
        );
        Ok(self.manifest.set_dependency(reference)?)
    }

    fn remove_package_reference(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.manifest.remove_dependency(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
    use crate::services::ProjectServices;
    use crate::test_support::handle_for;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "dependencies": {
    "Newtonsoft.Json": "13.0.3",
    "Polly": { "version": "8.2.0", "type": "build" },
    "Serilog": {}
  },
  "frameworks": {
    "uap10.0": {},
    "net46": {}
  }
}
"#;

    fn write_manifest(dir: &TempDir) -> JsonManifest {
        let path = dir.path().join(PROJECT_JSON);
        std::fs::write(&path, MANIFEST).unwrap();
        JsonManifest::new(path)
    }

    #[test]
    fn test_reads_dependencies_and_frameworks() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_manifest(&tmp);

        assert_eq!(
            manifest.dependencies().unwrap(),
            vec![
                PackageReference::new("Newtonsoft.Json", Some("13.0.3".to_string())),
                PackageReference::new("Polly", Some("8.2.0".to_string())),
                PackageReference::new("Serilog", None),
            ]
        );
        assert_eq!(manifest.frameworks().unwrap(), vec!["uap10.0", "net46"]);
    }

    #[test]
    fn test_update_keeps_order_and_extra_fields() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_manifest(&tmp);

        manifest
            .set_dependency(&PackageReference::new("polly", Some("8.3.0".to_string())))
            .unwrap();
        manifest
            .set_dependency(&PackageReference::new("Dapper", Some("2.1.28".to_string())))
            .unwrap();

        let names: Vec<_> = manifest
            .dependencies()
            .unwrap()
            .into_iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Newtonsoft.Json 13.0.3", "Polly 8.3.0", "Serilog", "Dapper 2.1.28"]
        );

        let content = std::fs::read_to_string(manifest.path()).unwrap();
        assert!(content.contains("\"type\": \"build\""));
    }

    #[test]
    fn test_remove_dependency() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_manifest(&tmp);

        assert!(manifest.remove_dependency("newtonsoft.json").unwrap());
        assert!(!manifest.remove_dependency("newtonsoft.json").unwrap());

        let deps = manifest.dependencies().unwrap();
        assert_eq!(deps[0].name, "Polly");
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_JSON);
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(JsonManifest::new(path).dependencies().is_err());
    }

    #[test]
    fn test_find_prefers_named_manifest() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PROJECT_JSON), "{}").unwrap();
        std::fs::write(tmp.path().join("App.project.json"), "{}").unwrap();

        let project = InMemoryProject::new("App", tmp.path().join("App.csproj"));
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert_eq!(
            find_manifest(&handle).unwrap(),
            Some(tmp.path().join("App.project.json"))
        );
    }

    #[test]
    fn test_find_deferred_uses_workspace() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(PROJECT_JSON), "{}").unwrap();

        let project = InMemoryProject::new("App", tmp.path().join("App.csproj")).deferred(true);
        let handle = handle_for(project, InMemoryWorkspace::new());

        assert_eq!(find_manifest(&handle).unwrap(), None);
    }

    #[test]
    fn test_bundle_reads_and_writes_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = Arc::new(write_manifest(&tmp));
        let project = InMemoryProject::new("App", tmp.path().join("App.csproj"));
        let handle = handle_for(project, InMemoryWorkspace::new());

        let bundle = manifest_bundle(&handle, manifest).unwrap();
        assert!(!bundle
            .capabilities()
            .unwrap()
            .supports_package_references()
            .unwrap());

        bundle
            .references_writer()
            .unwrap()
            .add_or_update_package_reference(&PackageReference::new("Dapper", None))
            .unwrap();
        let refs = bundle.references_reader().unwrap().package_references().unwrap();
        assert_eq!(refs.last(), Some(&PackageReference::new("Dapper", None)));
    }
}
