//! Build property names and the property reader contract.

use std::fmt;

use async_trait::async_trait;

/// MSBuild property names consulted during resolution.
pub mod names {
    /// Restore style selector (`PackageReference`, `PackagesConfig`, ...).
    pub const RESTORE_PROJECT_STYLE: &str = "RestoreProjectStyle";
    pub const PACKAGE_TARGET_FALLBACK: &str = "PackageTargetFallback";
    pub const PACKAGE_VERSION: &str = "PackageVersion";
    pub const VERSION: &str = "Version";
    pub const RUNTIME_IDENTIFIER: &str = "RuntimeIdentifier";
    pub const RUNTIME_IDENTIFIERS: &str = "RuntimeIdentifiers";
    pub const RUNTIME_SUPPORTS: &str = "RuntimeSupports";
    pub const TARGET_FRAMEWORK: &str = "TargetFramework";
    pub const TARGET_FRAMEWORKS: &str = "TargetFrameworks";
    pub const TARGET_FRAMEWORK_MONIKER: &str = "TargetFrameworkMoniker";
    pub const TARGET_PLATFORM_IDENTIFIER: &str = "TargetPlatformIdentifier";
    pub const TARGET_PLATFORM_VERSION: &str = "TargetPlatformVersion";
    pub const TARGET_PLATFORM_MIN_VERSION: &str = "TargetPlatformMinVersion";
    pub const BASE_INTERMEDIATE_OUTPUT_PATH: &str = "BaseIntermediateOutputPath";
}

/// Key/value access to a project's evaluated build properties.
///
/// Implementations return `None` for unset properties. Empty values are
/// normalised to `None` by [`non_empty`] before callers see them.
#[async_trait]
pub trait BuildPropertySource: Send + Sync {
    /// Read a property on the calling thread.
    fn property_value(&self, name: &str) -> Option<String>;

    /// Read a property without requiring the project to be loaded.
    async fn property_value_async(&self, name: &str) -> Option<String> {
        self.property_value(name)
    }
}

/// Drop empty and whitespace-only values.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a `;`-delimited property list, skipping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Declared restore style of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreStyle {
    PackageReference,
    PackagesConfig,
    ProjectJson,
    /// Some value the resolver doesn't interpret.
    Other(String),
}

impl RestoreStyle {
    /// Parse a `RestoreProjectStyle` value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let style = if value.eq_ignore_ascii_case("PackageReference") {
            RestoreStyle::PackageReference
        } else if value.eq_ignore_ascii_case("PackagesConfig") {
            RestoreStyle::PackagesConfig
        } else if value.eq_ignore_ascii_case("ProjectJson") {
            RestoreStyle::ProjectJson
        } else {
            RestoreStyle::Other(value.to_string())
        };
        Some(style)
    }

    pub fn is_package_reference(&self) -> bool {
        matches!(self, RestoreStyle::PackageReference)
    }
}

impl fmt::Display for RestoreStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreStyle::PackageReference => write!(f, "PackageReference"),
            RestoreStyle::PackagesConfig => write!(f, "PackagesConfig"),
            RestoreStyle::ProjectJson => write!(f, "ProjectJson"),
            RestoreStyle::Other(s) => write!(f, "{}", s),
        }
    }
}
