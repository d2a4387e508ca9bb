//! Project descriptors.
//!
//! A descriptor is a TOML file describing one IDE project as the host would
//! report it, plus what the deferred workspace knows about it:
//!
//! ```toml
//! name = "App"
//! path = "App/App.csproj"
//! deferred = true
//! types = ["csharp"]
//! capabilities = ["PackageReferences"]
//!
//! [properties]
//! RestoreProjectStyle = "PackageReference"
//!
//! [[items]]
//! type = "PackageReference"
//! include = "Serilog"
//! metadata = { Version = "3.1.1" }
//!
//! [workspace]
//! files = ["App/packages.config"]
//! ```
//!
//! Relative paths resolve against the descriptor's directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::host::ProjectItem;
use crate::core::project_type::guids;
use crate::host::memory::{InMemoryDataService, InMemoryProject, InMemoryWorkspace};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDescriptor {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Project file
    pub path: PathBuf,
    #[serde(default)]
    pub deferred: bool,
    /// Whether a deferred project can be loaded on demand
    #[serde(default = "default_true")]
    pub loadable: bool,
    /// Classifier GUIDs or their short names (`csharp`, `native`, ...)
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub items: Vec<ItemDescriptor>,
    #[serde(default)]
    pub project_references: Vec<PathBuf>,
    #[serde(default)]
    pub workspace: WorkspaceDescriptor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDescriptor {
    #[serde(rename = "type")]
    pub item_type: String,
    pub include: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// The deferred workspace's view of the project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceDescriptor {
    /// Files that exist logically, whether or not they are on disk
    pub files: Vec<PathBuf>,
    pub items: Vec<ItemDescriptor>,
    pub properties: BTreeMap<String, String>,
    pub project_references: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

/// Map a short classifier name to its GUID. Anything else passes through.
pub fn type_guid(tag: &str) -> String {
    let guid = match tag.trim().to_ascii_lowercase().as_str() {
        "csharp" | "c#" => guids::CSHARP,
        "vb" | "visualbasic" => guids::VB,
        "fsharp" | "f#" => guids::FSHARP,
        "web-application" => guids::WEB_APPLICATION,
        "web-site" => guids::WEB_SITE,
        "wix" => guids::WIX,
        "deployment" => guids::DEPLOYMENT,
        "javascript" => guids::JAVASCRIPT,
        "windows-store" => guids::WINDOWS_STORE,
        "native" | "cpp" => guids::NATIVE_CPP,
        _ => return tag.to_string(),
    };
    guid.to_string()
}

impl ItemDescriptor {
    fn to_item(&self) -> ProjectItem {
        self.metadata.iter().fold(
            ProjectItem::new(self.item_type.clone(), self.include.clone()),
            |item, (k, v)| item.with_metadata(k.clone(), v.clone()),
        )
    }
}

impl ProjectDescriptor {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "failed to parse project descriptor")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read descriptor: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Build the in-memory host for this project.
    pub fn build(&self, base: &Path) -> (InMemoryProject, InMemoryWorkspace) {
        let file = base.join(&self.path);

        let mut project = InMemoryProject::new(self.name.clone(), &file)
            .deferred(self.deferred)
            .loadable(self.loadable)
            .with_type_guids(self.types.iter().map(|t| type_guid(t)));
        if let Some(id) = &self.id {
            project = project.with_id(id.clone());
        }
        for (name, value) in &self.properties {
            project = project.with_property(name.clone(), value.clone());
        }
        for capability in &self.capabilities {
            project = project.with_capability(capability.clone());
        }
        for item in &self.items {
            project = project.with_item(item.to_item());
        }
        for reference in &self.project_references {
            project = project.with_project_reference(base.join(reference));
        }

        let ws = &self.workspace;
        let mut data = InMemoryDataService::new();
        for item in &ws.items {
            data = data.with_item(item.to_item());
        }
        for (name, value) in &ws.properties {
            data = data.with_property(name.clone(), value.clone());
        }

        let mut workspace = InMemoryWorkspace::new()
            .with_project_data(&file, data)
            .with_project_references(&file, ws.project_references.iter().map(|r| base.join(r)));
        for f in &ws.files {
            workspace = workspace.with_file(base.join(f));
        }

        (project, workspace)
    }
}
