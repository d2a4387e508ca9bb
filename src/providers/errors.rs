//! Resolution error types and diagnostics.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A provider that failed while probing.
///
/// Faults are non-fatal: the chain moves on to the next provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFault {
    pub provider: String,
    pub message: String,
}

impl ProbeFault {
    pub fn new(provider: impl Into<String>, error: &anyhow::Error) -> Self {
        ProbeFault {
            provider: provider.into(),
            message: format!("{:#}", error),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(format!("provider `{}` failed: {}", self.provider, self.message))
    }
}

impl fmt::Display for ProbeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.message)
    }
}

/// The declarative provider ordering can't be linearised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("provider `{provider}` is ordered after unknown provider `{predecessor}`")]
    UnknownPredecessor {
        provider: String,
        predecessor: String,
    },

    #[error("provider `{0}` is declared more than once")]
    DuplicateProvider(String),

    #[error("provider ordering has a cycle through `{provider}`")]
    Cycle { provider: String },
}

/// Error during project system resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no applicable project system for `{project}`")]
    NoApplicableProjectSystem {
        project: String,
        path: PathBuf,
        warnings: Vec<ProbeFault>,
    },

    #[error("`{project}` must be resolved on the coordinating thread")]
    WrongContext { project: String, path: PathBuf },

    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NoApplicableProjectSystem {
                project,
                path,
                warnings,
            } => {
                let mut diag =
                    Diagnostic::error(format!("no applicable project system for `{}`", project))
                        .with_location(path.clone());

                for fault in warnings {
                    diag = diag.with_context(fault.to_string());
                }

                diag.with_suggestion(suggestions::NO_PROJECT_SYSTEM)
                    .with_suggestion(suggestions::DISABLED_PROVIDERS)
            }

            ResolveError::WrongContext { project, path } => Diagnostic::error(format!(
                "`{}` was resolved off the coordinating thread",
                project
            ))
            .with_location(path.clone())
            .with_context("project state may only be read from the thread that owns the coordinator"),

            ResolveError::Ordering(err) => Diagnostic::error(err.to_string())
                .with_suggestion(suggestions::BROKEN_ORDERING),
        }
    }
}
