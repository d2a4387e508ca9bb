//! Test utilities for berth unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{handle_for, test_context, ScriptedProvider};
//!
//! #[test]
//! fn test_example() {
//!     let handle = handle_for(InMemoryProject::new("App", "/src/App/App.csproj"), InMemoryWorkspace::new());
//!     let provider = ScriptedProvider::accepting("any");
//!     assert!(provider.try_create(&handle, &test_context()).unwrap().is_some());
//! }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::core::handle::ProjectHandle;
use crate::core::project_system::{MsBuildFlavor, ProjectKind, ProjectStyle, ProjectSystem};
use crate::host::memory::{InMemoryProject, InMemoryWorkspace};
use crate::providers::context::{MessageLevel, ProjectContext, ResolutionContext};
use crate::providers::ProjectSystemProvider;
use crate::services::managed::managed_bundle;
use crate::services::{FallbackFactory, ServiceBundle};
use crate::util::coordinator::Coordinator;

/// Handle over in-memory collaborators, coordinated by the calling thread.
pub fn handle_for(project: InMemoryProject, workspace: InMemoryWorkspace) -> Arc<ProjectHandle> {
    let coordinator = Coordinator::new().unwrap();
    Arc::new(ProjectHandle::new(
        Arc::new(project),
        Arc::new(workspace),
        coordinator,
    ))
}

/// Resolution context installing packages under `/sln/packages`.
pub fn test_context() -> ResolutionContext {
    ResolutionContext::new(|| Ok(PathBuf::from("/sln/packages")))
}

/// Fallback factory building the model-backed bundle, counting invocations.
pub fn counting_factory(handle: Arc<ProjectHandle>) -> (FallbackFactory, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let factory: FallbackFactory = Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        managed_bundle(&handle)
    });
    (factory, calls)
}

/// Project context that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingContext {
    messages: Mutex<Vec<(MessageLevel, String)>>,
}

impl RecordingContext {
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProjectContext for RecordingContext {
    fn log(&self, level: MessageLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

#[derive(Debug, Clone)]
enum Script {
    Accept,
    Decline,
    Fault(String),
}

/// Provider with a fixed answer.
#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    after: Vec<&'static str>,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(name: &str, script: Script) -> Self {
        ScriptedProvider {
            name: name.to_string(),
            after: Vec::new(),
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds a generic msbuild project system.
    pub fn accepting(name: &str) -> Self {
        Self::new(name, Script::Accept)
    }

    pub fn declining(name: &str) -> Self {
        Self::new(name, Script::Decline)
    }

    pub fn faulting(name: &str, message: &str) -> Self {
        Self::new(name, Script::Fault(message.to_string()))
    }

    pub fn ordered_after(mut self, after: &[&'static str]) -> Self {
        self.after = after.to_vec();
        self
    }

    /// Probe counter, shared with the provider.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl ProjectSystemProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn after(&self) -> &[&str] {
        &self.after
    }

    fn try_create(
        &self,
        handle: &Arc<ProjectHandle>,
        _ctx: &ResolutionContext,
    ) -> Result<Option<ProjectSystem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Accept => Ok(Some(ProjectSystem::new(
                handle.clone(),
                ProjectStyle::PackagesConfig,
                ProjectKind::MsBuild(MsBuildFlavor::Generic),
                Box::new(ServiceBundle::new()),
            ))),
            Script::Decline => Ok(None),
            Script::Fault(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}
