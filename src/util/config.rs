//! Configuration file support for berth.
//!
//! Two configuration file locations:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Solution: `.berth/config.toml` - Solution-specific overrides
//!
//! Solution config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Packages directory used when none is configured.
pub const DEFAULT_PACKAGES_DIR: &str = "packages";

const CONFIG_DIR: &str = ".berth";
const CONFIG_FILE: &str = "config.toml";

/// berth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project system resolution settings
    pub resolution: ResolutionConfig,
}

/// Resolution-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Where packages.config projects install packages, relative to the
    /// solution directory
    pub packages_dir: Option<String>,

    /// Providers the factory skips
    #[serde(default)]
    pub disabled_providers: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.resolution.packages_dir.is_some() {
            self.resolution.packages_dir = other.resolution.packages_dir;
        }
        if !other.resolution.disabled_providers.is_empty() {
            self.resolution.disabled_providers = other.resolution.disabled_providers;
        }
    }

    pub fn packages_dir(&self) -> &str {
        self.resolution
            .packages_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_PACKAGES_DIR)
    }

    /// Whether a provider is switched off. Names compare case-insensitively.
    pub fn is_provider_disabled(&self, name: &str) -> bool {
        self.resolution
            .disabled_providers
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }
}

/// Load merged configuration from global and solution locations.
///
/// Order of precedence (highest to lowest):
/// 1. Solution config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Configuration for a solution rooted at `root`.
pub fn load_for(root: &Path) -> Config {
    let project = project_config_path(root);
    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(Path::new(""), &project),
    }
}

/// Get the global berth config directory (~/.berth).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.berth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the solution config path (.berth/config.toml).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}
