//! Project-type classifiers.
//!
//! Hosts describe a project's flavour with a set of GUID tags. Loaded and
//! deferred projects report the same vocabulary, so both paths are parsed
//! into [`ProjectType`] here. Order never matters.

use std::collections::BTreeSet;
use std::fmt;

/// GUID tags known to the resolver.
pub mod guids {
    pub const CSHARP: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";
    pub const VB: &str = "{F184B08F-C81C-45F6-A57F-5ABD9991F28F}";
    pub const FSHARP: &str = "{F2A71F9B-5D33-465A-A702-920D77279786}";
    pub const WEB_APPLICATION: &str = "{349C5851-65DF-11DA-9384-00065B846F21}";
    pub const WEB_SITE: &str = "{E24C65DC-7377-472B-9ABA-BC803B73C61A}";
    pub const WIX: &str = "{930C7802-8A8C-48F9-8165-68863BCCD9DD}";
    pub const DEPLOYMENT: &str = "{151D2E53-A2C4-4D7D-83FE-D05416EBD58E}";
    pub const JAVASCRIPT: &str = "{262852C6-CD72-467D-83FE-5EEB1973A190}";
    pub const WINDOWS_STORE: &str = "{BC8A1FFA-BEE3-4634-8014-F334798102B3}";
    pub const NATIVE_CPP: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";
}

/// A single project-type classifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectType {
    CSharp,
    VisualBasic,
    FSharp,
    WebApplication,
    WebSite,
    Wix,
    Deployment,
    JavaScript,
    WindowsStore,
    NativeCpp,
    /// Unrecognised tag, normalised to upper case with braces.
    Other(String),
}

impl ProjectType {
    /// Parse a GUID tag. Braces and case are optional.
    pub fn from_guid(guid: &str) -> Self {
        let normalized = normalize_guid(guid);
        match normalized.as_str() {
            guids::CSHARP => ProjectType::CSharp,
            guids::VB => ProjectType::VisualBasic,
            guids::FSHARP => ProjectType::FSharp,
            guids::WEB_APPLICATION => ProjectType::WebApplication,
            guids::WEB_SITE => ProjectType::WebSite,
            guids::WIX => ProjectType::Wix,
            guids::DEPLOYMENT => ProjectType::Deployment,
            guids::JAVASCRIPT => ProjectType::JavaScript,
            guids::WINDOWS_STORE => ProjectType::WindowsStore,
            guids::NATIVE_CPP => ProjectType::NativeCpp,
            _ => ProjectType::Other(normalized),
        }
    }

    /// The canonical GUID for this classifier.
    pub fn guid(&self) -> &str {
        match self {
            ProjectType::CSharp => guids::CSHARP,
            ProjectType::VisualBasic => guids::VB,
            ProjectType::FSharp => guids::FSHARP,
            ProjectType::WebApplication => guids::WEB_APPLICATION,
            ProjectType::WebSite => guids::WEB_SITE,
            ProjectType::Wix => guids::WIX,
            ProjectType::Deployment => guids::DEPLOYMENT,
            ProjectType::JavaScript => guids::JAVASCRIPT,
            ProjectType::WindowsStore => guids::WINDOWS_STORE,
            ProjectType::NativeCpp => guids::NATIVE_CPP,
            ProjectType::Other(guid) => guid,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectType::CSharp => "csharp",
            ProjectType::VisualBasic => "vb",
            ProjectType::FSharp => "fsharp",
            ProjectType::WebApplication => "web-application",
            ProjectType::WebSite => "web-site",
            ProjectType::Wix => "wix",
            ProjectType::Deployment => "deployment",
            ProjectType::JavaScript => "javascript",
            ProjectType::WindowsStore => "windows-store",
            ProjectType::NativeCpp => "native",
            ProjectType::Other(guid) => return write!(f, "{}", guid),
        };
        write!(f, "{}", name)
    }
}

fn normalize_guid(guid: &str) -> String {
    let trimmed = guid.trim().trim_start_matches('{').trim_end_matches('}');
    format!("{{{}}}", trimmed.to_ascii_uppercase())
}

/// The order-insensitive set of classifiers attached to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectTypes {
    types: BTreeSet<ProjectType>,
}

impl ProjectTypes {
    /// Parse a list of GUID tags as reported by a host.
    pub fn from_guids<I, S>(guids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ProjectTypes {
            types: guids
                .into_iter()
                .map(|g| ProjectType::from_guid(g.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, ty: &ProjectType) -> bool {
        self.types.contains(ty)
    }

    pub fn is_native(&self) -> bool {
        self.contains(&ProjectType::NativeCpp)
    }

    /// Managed-language projects whose package references can be served
    /// from the workspace while the project is still deferred.
    pub fn is_deferred_package_reference_capable(&self) -> bool {
        !self.is_native()
            && (self.contains(&ProjectType::CSharp) || self.contains(&ProjectType::VisualBasic))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<ProjectType> for ProjectTypes {
    fn from_iter<I: IntoIterator<Item = ProjectType>>(iter: I) -> Self {
        ProjectTypes {
            types: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ProjectTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
