//! Deferred service proxy.
//!
//! Fronts a representation whose project may still be deferred. Every call
//! re-reads the load state from the handle:
//!
//! ```text
//!             host reports loaded
//!   Deferred ─────────────────────► Loaded
//!      │                               │
//!      │ capabilities, reader          │ everything
//!      ▼                               ▼
//!   workspace bundle              fallback bundle (built once)
//! ```
//!
//! The writer and build-system slots have no deferred implementation and
//! always go to the fallback bundle, building it on first use even while the
//! project is nominally deferred. Once the fallback exists it serves every
//! call for the rest of the proxy's life.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::core::handle::ProjectHandle;
use crate::services::{
    BuildSystemAccessor, PackageReference, ProjectCapabilities, ProjectServices,
    ReferencesReader, ReferencesWriter, ServiceBundle, ServiceError,
};

/// Builds the fully capable bundle once the project is (or must be) loaded.
pub type FallbackFactory = Box<dyn Fn() -> Result<ServiceBundle, ServiceError> + Send + Sync>;

/// Load state as last observed by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyState {
    Deferred,
    Loaded,
}

pub struct DeferredServiceProxy {
    handle: Arc<ProjectHandle>,
    workspace: ServiceBundle,
    factory: FallbackFactory,
    fallback: OnceCell<ServiceBundle>,
    loaded: AtomicBool,
}

impl DeferredServiceProxy {
    /// `workspace` must bind the capabilities and references-reader slots.
    pub fn new(
        handle: Arc<ProjectHandle>,
        workspace: ServiceBundle,
        factory: FallbackFactory,
    ) -> Self {
        DeferredServiceProxy {
            handle,
            workspace,
            factory,
            fallback: OnceCell::new(),
            loaded: AtomicBool::new(false),
        }
    }

    /// Last observed state. Doesn't query the host.
    pub fn state(&self) -> ProxyState {
        if self.loaded.load(Ordering::Acquire) {
            ProxyState::Loaded
        } else {
            ProxyState::Deferred
        }
    }

    pub fn is_fallback_built(&self) -> bool {
        self.fallback.get().is_some()
    }

    /// Ask the handle for the current load state and record the transition.
    fn observe(&self) -> Result<ProxyState, ServiceError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(ProxyState::Loaded);
        }

        if self.handle.is_deferred()? {
            return Ok(ProxyState::Deferred);
        }

        if !self.loaded.swap(true, Ordering::AcqRel) {
            tracing::info!(
                "project `{}` finished loading, switching to full services",
                self.handle.name()
            );
        }
        Ok(ProxyState::Loaded)
    }

    /// The fallback bundle, built on first request.
    fn fallback(&self) -> Result<&ServiceBundle, ServiceError> {
        self.fallback.get_or_try_init(|| {
            tracing::debug!("building full services for `{}`", self.handle.name());
            (self.factory)()
        })
    }

    /// Bundle serving capability and reader calls right now.
    fn current(&self) -> Result<&ServiceBundle, ServiceError> {
        if let Some(fallback) = self.fallback.get() {
            return Ok(fallback);
        }

        match self.observe()? {
            ProxyState::Deferred => Ok(&self.workspace),
            ProxyState::Loaded => self.fallback(),
        }
    }
}

impl ProjectCapabilities for DeferredServiceProxy {
    fn supports_package_references(&self) -> Result<bool, ServiceError> {
        self.current()?.capabilities()?.supports_package_references()
    }

    fn nominates_on_solution_load(&self) -> Result<bool, ServiceError> {
        self.current()?.capabilities()?.nominates_on_solution_load()
    }
}

impl ReferencesReader for DeferredServiceProxy {
    fn package_references(&self) -> Result<Vec<PackageReference>, ServiceError> {
        self.current()?.references_reader()?.package_references()
    }

    fn project_references(&self) -> Result<Vec<PathBuf>, ServiceError> {
        self.current()?.references_reader()?.project_references()
    }
}

impl ProjectServices for DeferredServiceProxy {
    fn capabilities(&self) -> Result<&dyn ProjectCapabilities, ServiceError> {
        Ok(self)
    }

    fn references_reader(&self) -> Result<&dyn ReferencesReader, ServiceError> {
        Ok(self)
    }

    fn references_writer(&self) -> Result<&dyn ReferencesWriter, ServiceError> {
        self.fallback()?.references_writer()
    }

    fn build_system(&self) -> Result<&dyn BuildSystemAccessor, ServiceError> {
        self.fallback()?.build_system()
    }
}

impl std::fmt::Debug for DeferredServiceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredServiceProxy")
            .field("project", &self.handle.name())
            .field("state", &self.state())
            .field("fallback_built", &self.is_fallback_built())
            .finish()
    }
}
