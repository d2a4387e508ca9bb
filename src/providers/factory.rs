//! The composite project system factory.

use std::sync::Arc;

use crate::core::handle::ProjectHandle;
use crate::core::project_system::ProjectSystem;
use crate::providers::context::{MessageLevel, ResolutionContext};
use crate::providers::errors::{OrderingError, ProbeFault, ResolveError};
use crate::providers::ordering::{linearize, Declaration};
use crate::providers::{built_in, ProjectSystemProvider};
use crate::util::config::Config;

/// Outcome of running the provider chain.
#[derive(Debug)]
pub struct Resolution {
    /// Built by the first provider that accepted.
    pub system: Option<ProjectSystem>,
    /// Probe faults, kept only when no provider accepted.
    pub warnings: Vec<ProbeFault>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.system.is_some()
    }

    pub fn into_result(self, handle: &ProjectHandle) -> Result<ProjectSystem, ResolveError> {
        self.system
            .ok_or_else(|| ResolveError::NoApplicableProjectSystem {
                project: handle.name().to_string(),
                path: handle.hierarchy_path().to_path_buf(),
                warnings: self.warnings,
            })
    }
}

/// Runs providers in their resolved order and returns the first project
/// system produced.
pub struct ProjectSystemFactory {
    providers: Vec<Arc<dyn ProjectSystemProvider>>,
}

impl ProjectSystemFactory {
    /// Factory over the built-in providers.
    pub fn new() -> Result<Self, OrderingError> {
        Self::with_providers(built_in())
    }

    /// Built-in providers minus those disabled in `config`.
    pub fn from_config(config: &Config) -> Result<Self, OrderingError> {
        Ok(Self::new()?.without(|name| config.is_provider_disabled(name)))
    }

    /// Order `providers` by their `after` constraints.
    pub fn with_providers(
        providers: Vec<Arc<dyn ProjectSystemProvider>>,
    ) -> Result<Self, OrderingError> {
        let decls: Vec<Declaration<'_>> = providers
            .iter()
            .map(|p| Declaration {
                name: p.name(),
                after: p.after(),
            })
            .collect();
        let order = linearize(&decls)?;

        let providers = order.into_iter().map(|i| providers[i].clone()).collect();
        Ok(ProjectSystemFactory { providers })
    }

    /// Drop providers after ordering, so constraints through them still hold.
    pub fn without(mut self, disabled: impl Fn(&str) -> bool) -> Self {
        self.providers.retain(|p| {
            let skip = disabled(p.name());
            if skip {
                tracing::debug!("provider `{}` disabled", p.name());
            }
            !skip
        });
        self
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order until one builds a project system.
    ///
    /// A provider that fails is skipped. Its fault is reported in the
    /// outcome only if no later provider accepts.
    pub fn resolve(
        &self,
        handle: &Arc<ProjectHandle>,
        ctx: &ResolutionContext,
    ) -> Result<Resolution, ResolveError> {
        if !handle.coordinator().is_current() {
            return Err(ResolveError::WrongContext {
                project: handle.name().to_string(),
                path: handle.hierarchy_path().to_path_buf(),
            });
        }

        let mut faults = Vec::new();
        for provider in &self.providers {
            match provider.try_create(handle, ctx) {
                Ok(Some(system)) => {
                    tracing::debug!(
                        "provider `{}` claimed `{}` ({} earlier fault(s) discarded)",
                        provider.name(),
                        handle.name(),
                        faults.len()
                    );
                    return Ok(Resolution {
                        system: Some(system.with_provider(provider.name())),
                        warnings: Vec::new(),
                    });
                }
                Ok(None) => {
                    tracing::debug!("provider `{}` declined `{}`", provider.name(), handle.name());
                }
                Err(e) => {
                    tracing::debug!(
                        "provider `{}` failed on `{}`: {:#}",
                        provider.name(),
                        handle.name(),
                        e
                    );
                    faults.push(ProbeFault::new(provider.name(), &e));
                }
            }
        }

        for fault in &faults {
            ctx.log(MessageLevel::Warning, fault.to_string());
        }
        Ok(Resolution {
            system: None,
            warnings: faults,
        })
    }

    /// Like [`resolve`](Self::resolve), failing when nothing matched.
    pub fn create(
        &self,
        handle: &Arc<ProjectHandle>,
        ctx: &ResolutionContext,
    ) -> Result<ProjectSystem, ResolveError> {
        self.resolve(handle, ctx)?.into_result(handle)
    }
}

impl std::fmt::Debug for ProjectSystemFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectSystemFactory")
            .field("providers", &self.provider_names())
            .finish()
    }
}
