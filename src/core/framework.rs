//! Target framework derivation.
//!
//! A project's framework is spread over several build properties. This module
//! folds them into one normalised framework string with a pure function, so
//! loaded and deferred projects agree on the result.

use std::fmt;

use crate::core::properties::split_list;

/// Identifier used when no framework can be derived.
pub const UNSUPPORTED_IDENTIFIER: &str = "Unsupported";

const UAP_IDENTIFIER: &str = "UAP";
const NATIVE_FRAMEWORK: &str = "native,Version=v0.0";

/// A normalised framework name, e.g. `.NETFramework,Version=v4.6.1` or `net8.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameworkName(String);

impl FrameworkName {
    pub fn new(name: impl Into<String>) -> Self {
        FrameworkName(name.into())
    }

    /// The explicit "nothing matched" sentinel.
    pub fn unsupported() -> Self {
        FrameworkName(format!("{},Version=v0.0", UNSUPPORTED_IDENTIFIER))
    }

    pub fn is_unsupported(&self) -> bool {
        self.identifier()
            .eq_ignore_ascii_case(UNSUPPORTED_IDENTIFIER)
    }

    /// Part before the first comma.
    pub fn identifier(&self) -> &str {
        self.0.split(',').next().unwrap_or("").trim()
    }

    /// Value of the `Version=` component, without the leading `v`.
    pub fn version(&self) -> Option<&str> {
        self.0.split(',').skip(1).find_map(|part| {
            let (key, value) = part.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("Version") {
                Some(value.trim().trim_start_matches(['v', 'V']))
            } else {
                None
            }
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw property values that feed framework derivation.
#[derive(Debug, Clone, Default)]
pub struct FrameworkProperties {
    pub target_frameworks: Option<String>,
    pub target_framework: Option<String>,
    pub target_framework_moniker: Option<String>,
    pub target_platform_identifier: Option<String>,
    pub target_platform_version: Option<String>,
    pub target_platform_min_version: Option<String>,
    /// The project file is a native (`.vcxproj`) project.
    pub native_project: bool,
}

/// Fold framework properties into a single framework name.
///
/// Precedence: multi-targeting list, single target, UAP platform, moniker,
/// other platforms, native projects. Never fails; when nothing applies the
/// result is [`FrameworkName::unsupported`].
pub fn derive_framework(props: &FrameworkProperties) -> FrameworkName {
    if let Some(first) = props
        .target_frameworks
        .as_deref()
        .and_then(|list| split_list(list).into_iter().next())
    {
        return FrameworkName::new(first);
    }

    if let Some(tf) = present(&props.target_framework) {
        return FrameworkName::new(tf);
    }

    let platform = present(&props.target_platform_identifier);

    if let Some(id) = platform.filter(|id| id.eq_ignore_ascii_case(UAP_IDENTIFIER)) {
        let version = present(&props.target_platform_min_version)
            .or_else(|| present(&props.target_platform_version));
        if let Some(version) = version {
            return versioned(id, version);
        }
    }

    if let Some(moniker) = present(&props.target_framework_moniker) {
        return FrameworkName::new(moniker);
    }

    if let (Some(id), Some(version)) = (platform, present(&props.target_platform_version)) {
        return versioned(id, version);
    }

    if props.native_project {
        return FrameworkName::new(NATIVE_FRAMEWORK);
    }

    FrameworkName::unsupported()
}

/// Rewrite a UAP framework to the project's minimum platform version.
///
/// Anything that isn't UAP, or a missing minimum version, is returned as is.
pub fn apply_platform_min_version(
    framework: FrameworkName,
    min_version: Option<&str>,
) -> FrameworkName {
    match min_version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(min) if framework.identifier().eq_ignore_ascii_case(UAP_IDENTIFIER) => {
            versioned(UAP_IDENTIFIER, min)
        }
        _ => framework,
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn versioned(identifier: &str, version: &str) -> FrameworkName {
    let version = version.trim_start_matches(['v', 'V']);
    FrameworkName::new(format!("{},Version=v{}", identifier, version))
}
