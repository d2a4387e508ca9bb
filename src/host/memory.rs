//! In-memory host collaborators.
//!
//! These back the `berth` CLI (via project descriptors) and the test suite.
//! State lives behind shared locks so a test can keep a clone and flip load
//! state or edit items while a handle is looking at the same project.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::core::host::{
    DeferredWorkspace, HostProject, ProjectDataService, ProjectItem, ProjectModel,
};
use crate::core::properties::BuildPropertySource;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Build properties
// =============================================================================

/// Property bag shared between a project and its handle.
#[derive(Debug, Default)]
pub struct InMemoryProperties {
    values: Mutex<BTreeMap<String, String>>,
}

impl InMemoryProperties {
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        lock(&self.values).insert(name.into(), value.into());
    }
}

impl BuildPropertySource for InMemoryProperties {
    fn property_value(&self, name: &str) -> Option<String> {
        lock(&self.values).get(name).cloned()
    }
}

// =============================================================================
// Project
// =============================================================================

/// A project whose metadata and live model are both held in memory.
#[derive(Clone)]
pub struct InMemoryProject {
    state: Arc<ProjectState>,
}

struct ProjectState {
    name: String,
    id: OnceCell<String>,
    hierarchy_path: PathBuf,
    loaded_path: Mutex<Option<PathBuf>>,
    deferred: AtomicBool,
    loadable: AtomicBool,
    type_guids: Mutex<Vec<String>>,
    properties: Arc<InMemoryProperties>,
    capabilities: Mutex<BTreeSet<String>>,
    items: Mutex<Vec<ProjectItem>>,
    project_references: Mutex<Vec<PathBuf>>,
    loads: AtomicUsize,
}

impl InMemoryProject {
    /// A loaded project with no properties, items or classifiers.
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        InMemoryProject {
            state: Arc::new(ProjectState {
                name: name.into(),
                id: OnceCell::new(),
                hierarchy_path: path.as_ref().to_path_buf(),
                loaded_path: Mutex::new(None),
                deferred: AtomicBool::new(false),
                loadable: AtomicBool::new(true),
                type_guids: Mutex::new(Vec::new()),
                properties: Arc::new(InMemoryProperties::default()),
                capabilities: Mutex::new(BTreeSet::new()),
                items: Mutex::new(Vec::new()),
                project_references: Mutex::new(Vec::new()),
                loads: AtomicUsize::new(0),
            }),
        }
    }

    /// Assign a project id. The first id assigned sticks.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let _ = self.state.id.set(id.into());
        self
    }

    pub fn deferred(self, deferred: bool) -> Self {
        self.set_deferred(deferred);
        self
    }

    /// Whether `load_project` may materialise a deferred project.
    pub fn loadable(self, loadable: bool) -> Self {
        self.state.loadable.store(loadable, Ordering::SeqCst);
        self
    }

    /// Path reported by the live model once loaded.
    pub fn with_loaded_path(self, path: impl AsRef<Path>) -> Self {
        *lock(&self.state.loaded_path) = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_type_guids<I, S>(self, guids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_type_guids(guids);
        self
    }

    pub fn with_property(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.properties.set(name, value);
        self
    }

    pub fn with_capability(self, capability: impl Into<String>) -> Self {
        lock(&self.state.capabilities).insert(capability.into());
        self
    }

    pub fn with_item(self, item: ProjectItem) -> Self {
        lock(&self.state.items).push(item);
        self
    }

    pub fn with_project_reference(self, path: impl AsRef<Path>) -> Self {
        lock(&self.state.project_references).push(path.as_ref().to_path_buf());
        self
    }

    pub fn set_deferred(&self, deferred: bool) {
        self.state.deferred.store(deferred, Ordering::SeqCst);
    }

    /// Simulate the host finishing a background load.
    pub fn finish_loading(&self) {
        self.set_deferred(false);
    }

    pub fn set_type_guids<I, S>(&self, guids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.state.type_guids) = guids.into_iter().map(Into::into).collect();
    }

    pub fn properties(&self) -> Arc<InMemoryProperties> {
        self.state.properties.clone()
    }

    /// How many times the live model was materialised.
    pub fn load_count(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostProject for InMemoryProject {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn project_id(&self) -> Option<&str> {
        self.state.id.get().map(String::as_str)
    }

    async fn is_deferred(&self) -> Result<bool> {
        Ok(self.state.deferred.load(Ordering::SeqCst))
    }

    fn hierarchy_path(&self) -> &Path {
        &self.state.hierarchy_path
    }

    fn hierarchy_type_guids(&self) -> Vec<String> {
        lock(&self.state.type_guids).clone()
    }

    fn build_properties(&self) -> Arc<dyn BuildPropertySource> {
        self.state.properties.clone()
    }

    async fn load_project(&self) -> Result<Option<Arc<dyn ProjectModel>>> {
        if self.state.deferred.load(Ordering::SeqCst) {
            if !self.state.loadable.load(Ordering::SeqCst) {
                return Ok(None);
            }
            self.state.deferred.store(false, Ordering::SeqCst);
        }
        self.state.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Arc::new(self.clone())))
    }
}

impl ProjectModel for InMemoryProject {
    fn full_path(&self) -> PathBuf {
        lock(&self.state.loaded_path)
            .clone()
            .unwrap_or_else(|| self.state.hierarchy_path.clone())
    }

    fn type_guids(&self) -> Vec<String> {
        lock(&self.state.type_guids).clone()
    }

    fn has_capability(&self, capability: &str) -> bool {
        lock(&self.state.capabilities).contains(capability)
    }

    fn items(&self, item_type: &str) -> Vec<ProjectItem> {
        lock(&self.state.items)
            .iter()
            .filter(|item| item.item_type == item_type)
            .cloned()
            .collect()
    }

    fn upsert_item(&self, item: ProjectItem) -> Result<()> {
        let mut items = lock(&self.state.items);
        match items
            .iter_mut()
            .find(|i| i.item_type == item.item_type && i.include.eq_ignore_ascii_case(&item.include))
        {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }

    fn remove_item(&self, item_type: &str, include: &str) -> Result<bool> {
        let mut items = lock(&self.state.items);
        let before = items.len();
        items.retain(|i| !(i.item_type == item_type && i.include.eq_ignore_ascii_case(include)));
        Ok(items.len() != before)
    }

    fn project_references(&self) -> Vec<PathBuf> {
        lock(&self.state.project_references).clone()
    }
}

// =============================================================================
// Workspace
// =============================================================================

/// Deferred-workspace view: logical files, references and per-project data.
#[derive(Clone, Default)]
pub struct InMemoryWorkspace {
    state: Arc<WorkspaceState>,
}

#[derive(Default)]
struct WorkspaceState {
    files: Mutex<BTreeSet<PathBuf>>,
    references: Mutex<BTreeMap<PathBuf, Vec<PathBuf>>>,
    data: Mutex<BTreeMap<PathBuf, Arc<InMemoryDataService>>>,
    queries: AtomicUsize,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        lock(&self.state.files).insert(path.as_ref().to_path_buf());
        self
    }

    pub fn with_project_references<I, P>(self, project_file: impl AsRef<Path>, references: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        lock(&self.state.references).insert(
            project_file.as_ref().to_path_buf(),
            references
                .into_iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
        );
        self
    }

    pub fn with_project_data(
        self,
        project_file: impl AsRef<Path>,
        data: InMemoryDataService,
    ) -> Self {
        lock(&self.state.data).insert(project_file.as_ref().to_path_buf(), Arc::new(data));
        self
    }

    /// Number of queries answered so far.
    pub fn query_count(&self) -> usize {
        self.state.queries.load(Ordering::SeqCst)
    }

    fn record_query(&self) {
        self.state.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeferredWorkspace for InMemoryWorkspace {
    async fn entity_exists(&self, path: &Path) -> Result<bool> {
        self.record_query();
        Ok(lock(&self.state.files).contains(path))
    }

    async fn project_references(&self, project_file: &Path) -> Result<Vec<PathBuf>> {
        self.record_query();
        Ok(lock(&self.state.references)
            .get(project_file)
            .cloned()
            .unwrap_or_default())
    }

    async fn project_data_service(
        &self,
        project_file: &Path,
    ) -> Result<Option<Arc<dyn ProjectDataService>>> {
        self.record_query();
        Ok(lock(&self.state.data)
            .get(project_file)
            .map(|d| d.clone() as Arc<dyn ProjectDataService>))
    }
}

/// Items and properties of one deferred project.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataService {
    items: Vec<ProjectItem>,
    properties: BTreeMap<String, String>,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: ProjectItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl ProjectDataService for InMemoryDataService {
    async fn items(&self, item_type: &str) -> Result<Vec<ProjectItem>> {
        Ok(self
            .items
            .iter()
            .filter(|item| item.item_type == item_type)
            .cloned()
            .collect())
    }

    async fn property(&self, name: &str) -> Result<Option<String>> {
        Ok(self.properties.get(name).cloned())
    }
}
