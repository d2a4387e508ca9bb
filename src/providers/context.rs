//! Resolution context handed to every provider.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::util::config::Config;

/// Supplies the directory packages are installed into.
pub type PackagesPathSupplier = Arc<dyn Fn() -> Result<PathBuf> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Ambient logging sink of the caller that asked for resolution.
pub trait ProjectContext: Send + Sync {
    fn log(&self, level: MessageLevel, message: &str);
}

/// Forwards project context messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProjectContext;

impl ProjectContext for TracingProjectContext {
    fn log(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Debug => tracing::debug!("{}", message),
            MessageLevel::Info => tracing::info!("{}", message),
            MessageLevel::Warning => tracing::warn!("{}", message),
            MessageLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// Inputs shared by all providers during one resolution.
#[derive(Clone)]
pub struct ResolutionContext {
    packages_path: PackagesPathSupplier,
    project_context: Arc<dyn ProjectContext>,
}

impl ResolutionContext {
    pub fn new<F>(packages_path: F) -> Self
    where
        F: Fn() -> Result<PathBuf> + Send + Sync + 'static,
    {
        ResolutionContext {
            packages_path: Arc::new(packages_path),
            project_context: Arc::new(TracingProjectContext),
        }
    }

    /// Packages directory from configuration, under `solution_dir`.
    pub fn from_config(solution_dir: &Path, config: &Config) -> Self {
        let path = solution_dir.join(config.packages_dir());
        Self::new(move || Ok(path.clone()))
    }

    pub fn with_project_context(mut self, context: Arc<dyn ProjectContext>) -> Self {
        self.project_context = context;
        self
    }

    pub fn packages_path(&self) -> Result<PathBuf> {
        (self.packages_path)()
    }

    pub fn project_context(&self) -> &dyn ProjectContext {
        self.project_context.as_ref()
    }

    pub fn log(&self, level: MessageLevel, message: impl AsRef<str>) {
        self.project_context.log(level, message.as_ref());
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingContext;

    #[test]
    fn test_packages_path_from_config() {
        let mut config = Config::default();
        config.resolution.packages_dir = Some("lib".to_string());

        let ctx = ResolutionContext::from_config(Path::new("/sln"), &config);
        assert_eq!(ctx.packages_path().unwrap(), PathBuf::from("/sln/lib"));
    }

    #[test]
    fn test_messages_reach_project_context() {
        let recorder = Arc::new(RecordingContext::default());
        let ctx = ResolutionContext::new(|| Ok(PathBuf::from("packages")))
            .with_project_context(recorder.clone());

        ctx.log(MessageLevel::Warning, "provider failed");
        assert_eq!(
            recorder.messages(),
            vec![(MessageLevel::Warning, "provider failed".to_string())]
        );
    }
}
