//! Target framework identifiers
//!
//! Handles moniker formats:
//! - Short folder names: `net45`, `net472`, `netcoreapp1.0`, `netstandard2.0`
//! - Modern short names with optional platform: `net8.0`, `net8.0-windows`
//! - Long monikers: `.NETFramework,Version=v4.5`, `.NETCoreApp,Version=v1.0`

use crate::error::FrameworkError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// Regex patterns for target framework monikers
static SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(netcoreapp|netstandard|net)(\d+(?:\.\d+)*)(?:-([a-z][a-z0-9.]*))?$").unwrap()
});
static LONG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\.[a-z]+)\s*,\s*version\s*=\s*v?(\d+(?:\.\d+)*)(?:\s*,\s*profile\s*=\s*\w+)?$")
        .unwrap()
});

/// First major version of `.NETCoreApp` that uses the `netX.Y` short name
const NET5_MAJOR: u32 = 5;

/// Framework family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameworkFamily {
    /// .NET Framework (`net45`, `net472`)
    NetFramework,
    /// .NET Core and .NET 5+ (`netcoreapp1.0`, `net8.0`)
    NetCoreApp,
    /// .NET Standard (`netstandard2.0`)
    NetStandard,
}

impl FrameworkFamily {
    /// Returns the long identifier used in full framework names
    pub fn identifier(&self) -> &'static str {
        match self {
            FrameworkFamily::NetFramework => ".NETFramework",
            FrameworkFamily::NetCoreApp => ".NETCoreApp",
            FrameworkFamily::NetStandard => ".NETStandard",
        }
    }

    fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.to_ascii_lowercase().as_str() {
            ".netframework" => Some(FrameworkFamily::NetFramework),
            ".netcoreapp" => Some(FrameworkFamily::NetCoreApp),
            ".netstandard" => Some(FrameworkFamily::NetStandard),
            _ => None,
        }
    }
}

/// A parsed target framework
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Framework {
    family: FrameworkFamily,
    version: [u32; 4],
    platform: Option<String>,
}

impl Framework {
    /// Parse a short or long target framework moniker
    pub fn parse(moniker: &str) -> Result<Self, FrameworkError> {
        let trimmed = moniker.trim();
        if trimmed.is_empty() {
            return Err(FrameworkError::Empty);
        }

        let lowered = trimmed.to_ascii_lowercase();

        if let Some(caps) = LONG_RE.captures(&lowered) {
            let family = FrameworkFamily::from_identifier(&caps[1])
                .ok_or_else(|| FrameworkError::unrecognized(trimmed))?;
            let version = parse_dotted(&caps[2]).ok_or_else(|| FrameworkError::invalid_version(trimmed))?;
            return Ok(Self {
                family,
                version,
                platform: None,
            });
        }

        let caps = SHORT_RE
            .captures(&lowered)
            .ok_or_else(|| FrameworkError::unrecognized(trimmed))?;
        let raw_version = &caps[2];
        let dotted = raw_version.contains('.');
        let version = if dotted {
            parse_dotted(raw_version)
        } else {
            parse_compact(raw_version)
        }
        .ok_or_else(|| FrameworkError::invalid_version(trimmed))?;

        let family = match &caps[1] {
            "netcoreapp" => FrameworkFamily::NetCoreApp,
            "netstandard" => FrameworkFamily::NetStandard,
            _ if dotted && version[0] >= NET5_MAJOR => FrameworkFamily::NetCoreApp,
            _ => FrameworkFamily::NetFramework,
        };

        let platform = caps.get(3).map(|m| m.as_str().to_string());
        if platform.is_some() && !(family == FrameworkFamily::NetCoreApp && version[0] >= NET5_MAJOR) {
            return Err(FrameworkError::unrecognized(trimmed));
        }

        Ok(Self {
            family,
            version,
            platform,
        })
    }

    /// Returns the canonical short folder name (e.g. `net45`, `netcoreapp1.0`)
    pub fn short_folder_name(&self) -> String {
        let [major, minor, ..] = self.version;
        match self.family {
            FrameworkFamily::NetFramework => {
                let parts = significant_parts(&self.version);
                if parts.iter().any(|p| *p >= 10) {
                    let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                    format!("net{}", joined.join("."))
                } else {
                    let joined: String = parts.iter().map(|p| p.to_string()).collect();
                    format!("net{}", joined)
                }
            }
            FrameworkFamily::NetCoreApp if major >= NET5_MAJOR => match &self.platform {
                Some(platform) => format!("net{}.{}-{}", major, minor, platform),
                None => format!("net{}.{}", major, minor),
            },
            FrameworkFamily::NetCoreApp => format!("netcoreapp{}.{}", major, minor),
            FrameworkFamily::NetStandard => format!("netstandard{}.{}", major, minor),
        }
    }

    /// Returns the full framework name (e.g. `.NETFramework,Version=v4.5`)
    pub fn full_name(&self) -> String {
        let [major, minor, build, revision] = self.version;
        let mut version = format!("{}.{}", major, minor);
        if build != 0 || revision != 0 {
            version.push_str(&format!(".{}", build));
        }
        if revision != 0 {
            version.push_str(&format!(".{}", revision));
        }
        format!("{},Version=v{}", self.family.identifier(), version)
    }
}

/// Parse `1.0` / `4.7.2` into four parts
fn parse_dotted(value: &str) -> Option<[u32; 4]> {
    let mut version = [0u32; 4];
    let parts: Vec<&str> = value.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }
    for (slot, part) in version.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(version)
}

/// Parse the compact form used by `net45` / `net472`: one digit per part
fn parse_compact(value: &str) -> Option<[u32; 4]> {
    if value.is_empty() || value.len() > 4 {
        return None;
    }
    let mut version = [0u32; 4];
    for (slot, ch) in version.iter_mut().zip(value.chars()) {
        *slot = ch.to_digit(10)?;
    }
    Some(version)
}

/// Version parts with trailing zeros stripped, keeping at least two
fn significant_parts(version: &[u32; 4]) -> Vec<u32> {
    let mut len = version.len();
    while len > 2 && version[len - 1] == 0 {
        len -= 1;
    }
    version[..len].to_vec()
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_folder_name())
    }
}

impl FromStr for Framework {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::parse(s)
    }
}

impl TryFrom<String> for Framework {
    type Error = FrameworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Framework::parse(&value)
    }
}

impl From<Framework> for String {
    fn from(framework: Framework) -> Self {
        framework.short_folder_name()
    }
}

impl Ord for Framework {
    fn cmp(&self, other: &Self) -> Ordering {
        FrameworkSorter.compare(self, other)
    }
}

impl PartialOrd for Framework {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A total ordering over frameworks used to break ties between candidates
/// declared under several target frameworks. The first framework wins.
pub trait FrameworkOrdering: Send + Sync {
    /// Compare two frameworks
    fn compare(&self, a: &Framework, b: &Framework) -> Ordering;
}

/// Canonical framework ordering: family identifier (ordinal, ignoring case),
/// then version ascending, then platform (none first)
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkSorter;

impl FrameworkOrdering for FrameworkSorter {
    fn compare(&self, a: &Framework, b: &Framework) -> Ordering {
        a.family
            .identifier()
            .to_ascii_lowercase()
            .cmp(&b.family.identifier().to_ascii_lowercase())
            .then_with(|| a.version.cmp(&b.version))
            .then_with(|| a.platform.cmp(&b.platform))
    }
}

/// Ordering by an explicit priority list, typically the declaration order
/// of a project's target frameworks. Unlisted frameworks sort last.
#[derive(Debug, Clone, Default)]
pub struct DeclaredOrder {
    frameworks: Vec<Framework>,
}

impl DeclaredOrder {
    /// Create an ordering from a priority list
    pub fn new(frameworks: Vec<Framework>) -> Self {
        Self { frameworks }
    }

    fn rank(&self, framework: &Framework) -> usize {
        self.frameworks
            .iter()
            .position(|f| f == framework)
            .unwrap_or(self.frameworks.len())
    }
}

impl FrameworkOrdering for DeclaredOrder {
    fn compare(&self, a: &Framework, b: &Framework) -> Ordering {
        self.rank(a)
            .cmp(&self.rank(b))
            .then_with(|| FrameworkSorter.compare(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fw(moniker: &str) -> Framework {
        Framework::parse(moniker).unwrap()
    }

    #[test]
    fn test_parse_net_framework_compact() {
        let f = fw("net45");
        assert_eq!(f.family, FrameworkFamily::NetFramework);
        assert_eq!(f.version, [4, 5, 0, 0]);
        assert_eq!(f.short_folder_name(), "net45");

        let f = fw("net472");
        assert_eq!(f.version, [4, 7, 2, 0]);
        assert_eq!(f.short_folder_name(), "net472");
    }

    #[test]
    fn test_parse_netcoreapp() {
        let f = fw("netcoreapp1.0");
        assert_eq!(f.family, FrameworkFamily::NetCoreApp);
        assert_eq!(f.version, [1, 0, 0, 0]);
        assert_eq!(f.short_folder_name(), "netcoreapp1.0");
    }

    #[test]
    fn test_parse_netstandard() {
        let f = fw("NetStandard2.0");
        assert_eq!(f.family, FrameworkFamily::NetStandard);
        assert_eq!(f.short_folder_name(), "netstandard2.0");
    }

    #[test]
    fn test_parse_net5_plus() {
        let f = fw("net8.0");
        assert_eq!(f.family, FrameworkFamily::NetCoreApp);
        assert_eq!(f.short_folder_name(), "net8.0");

        let f = fw("net8.0-windows");
        assert_eq!(f.platform.as_deref(), Some("windows"));
        assert_eq!(f.short_folder_name(), "net8.0-windows");
    }

    #[test]
    fn test_parse_long_monikers() {
        assert_eq!(fw(".NETFramework,Version=v4.5"), fw("net45"));
        assert_eq!(fw(".NETCoreApp,Version=v1.0"), fw("netcoreapp1.0"));
        assert_eq!(fw(".NETStandard, Version=v2.0"), fw("netstandard2.0"));
        assert_eq!(
            fw(".NETFramework,Version=v4.0,Profile=Client").short_folder_name(),
            "net40"
        );
    }

    #[test]
    fn test_full_name() {
        assert_eq!(fw("net45").full_name(), ".NETFramework,Version=v4.5");
        assert_eq!(fw("net472").full_name(), ".NETFramework,Version=v4.7.2");
        assert_eq!(fw("netcoreapp1.0").full_name(), ".NETCoreApp,Version=v1.0");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Framework::parse(""), Err(FrameworkError::Empty));
        assert_eq!(Framework::parse("   "), Err(FrameworkError::Empty));
        assert!(matches!(
            Framework::parse("foo1.0"),
            Err(FrameworkError::Unrecognized { .. })
        ));
        assert!(matches!(
            Framework::parse("net45-windows"),
            Err(FrameworkError::Unrecognized { .. })
        ));
        assert!(matches!(
            Framework::parse(".Silverlight,Version=v5.0"),
            Err(FrameworkError::Unrecognized { .. })
        ));
        assert!(matches!(
            Framework::parse("net12345"),
            Err(FrameworkError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_canonical_sorter() {
        let mut frameworks = vec![fw("net472"), fw("netstandard2.0"), fw("net45"), fw("netcoreapp1.0")];
        frameworks.sort();
        let names: Vec<String> = frameworks.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["netcoreapp1.0", "net45", "net472", "netstandard2.0"]);
    }

    #[test]
    fn test_declared_order() {
        let order = DeclaredOrder::new(vec![fw("net472"), fw("net45")]);
        assert_eq!(order.compare(&fw("net472"), &fw("net45")), Ordering::Less);
        assert_eq!(order.compare(&fw("net45"), &fw("netcoreapp1.0")), Ordering::Less);
    }

    #[test]
    fn test_serde_framework() {
        let json = serde_json::to_string(&fw("net45")).unwrap();
        assert_eq!(json, "\"net45\"");
        let parsed: Framework = serde_json::from_str("\".NETCoreApp,Version=v1.0\"").unwrap();
        assert_eq!(parsed, fw("netcoreapp1.0"));
        assert!(serde_json::from_str::<Framework>("\"bogus\"").is_err());
    }
}
