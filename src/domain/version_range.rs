//! Package versions and version ranges
//!
//! Handles range formats:
//! - Bare minimum: `1.0.0` (>= 1.0.0)
//! - Interval notation: `[1.0.0, )`, `[1.0, 2.0)`, `(, 2.0]`
//! - Exact: `[1.0.0]`
//! - Floating: `1.*`, `1.0.*`, `*`
//!
//! Versions have up to four numeric parts and an optional prerelease label.
//! Prerelease labels compare case-insensitively and build metadata is ignored.

use crate::error::VersionRangeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A package version with an optional fourth (revision) part
#[derive(Debug, Clone)]
pub struct PackageVersion {
    version: semver::Version,
    revision: u64,
}

impl PackageVersion {
    /// Parse a version such as `1.0`, `1.0.0`, `1.0.0.1` or `2.0.0-Beta+sha`
    pub fn parse(value: &str) -> Result<Self, VersionRangeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VersionRangeError::Empty);
        }

        let without_metadata = trimmed.split('+').next().unwrap_or(trimmed);
        let (numbers, prerelease) = match without_metadata.split_once('-') {
            Some((numbers, pre)) => (numbers, Some(pre)),
            None => (without_metadata, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(VersionRangeError::invalid_version(trimmed));
        }
        let mut numeric = [0u64; 4];
        for (slot, part) in numeric.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| VersionRangeError::invalid_version(trimmed))?;
        }

        let mut version = semver::Version::new(numeric[0], numeric[1], numeric[2]);
        if let Some(pre) = prerelease {
            version.pre = semver::Prerelease::new(&pre.to_ascii_lowercase())
                .map_err(|_| VersionRangeError::invalid_version(trimmed))?;
        }

        Ok(Self {
            version,
            revision: numeric[3],
        })
    }

    /// Create a release version from three parts
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: semver::Version::new(major, minor, patch),
            revision: 0,
        }
    }

    /// Returns true if this version carries a prerelease label
    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// Normalized form: three parts, a fourth only when non-zero, lower-cased label
    pub fn to_normalized_string(&self) -> String {
        let mut out = format!(
            "{}.{}.{}",
            self.version.major, self.version.minor, self.version.patch
        );
        if self.revision != 0 {
            out.push_str(&format!(".{}", self.revision));
        }
        if self.is_prerelease() {
            out.push('-');
            out.push_str(self.version.pre.as_str());
        }
        out
    }

    fn numeric(&self) -> (u64, u64, u64, u64) {
        (
            self.version.major,
            self.version.minor,
            self.version.patch,
            self.revision,
        )
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric().hash(state);
        self.version.pre.as_str().hash(state);
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric().cmp(&other.numeric()).then_with(|| {
            // A release sorts after any prerelease of the same numbers
            match (self.is_prerelease(), other.is_prerelease()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (true, true) => self.version.pre.cmp(&other.version.pre),
            }
        })
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_normalized_string())
    }
}

impl FromStr for PackageVersion {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageVersion::parse(s)
    }
}

/// A version range with optional lower and upper bounds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    min: Option<PackageVersion>,
    include_min: bool,
    max: Option<PackageVersion>,
    include_max: bool,
}

impl VersionRange {
    /// The unbounded range accepting any version
    pub fn all() -> Self {
        Self {
            min: None,
            include_min: false,
            max: None,
            include_max: false,
        }
    }

    /// A range accepting `version` and anything above it
    pub fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(version),
            include_min: true,
            max: None,
            include_max: false,
        }
    }

    /// A range accepting exactly `version`
    pub fn exact(version: PackageVersion) -> Self {
        Self {
            min: Some(version.clone()),
            include_min: true,
            max: Some(version),
            include_max: true,
        }
    }

    /// Parse a version range string
    pub fn parse(value: &str) -> Result<Self, VersionRangeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VersionRangeError::Empty);
        }

        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            return Self::parse_interval(trimmed);
        }

        if let Some(base) = trimmed.strip_suffix('*') {
            return Self::parse_floating(trimmed, base);
        }

        Ok(Self::at_least(PackageVersion::parse(trimmed)?))
    }

    fn parse_floating(original: &str, base: &str) -> Result<Self, VersionRangeError> {
        let base = base.trim_end_matches(['.', '-']);
        let min = if base.is_empty() {
            PackageVersion::new(0, 0, 0)
        } else {
            PackageVersion::parse(base)
                .map_err(|_| VersionRangeError::invalid_range(original, "invalid floating version"))?
        };
        Ok(Self::at_least(min))
    }

    fn parse_interval(original: &str) -> Result<Self, VersionRangeError> {
        let include_min = original.starts_with('[');
        let include_max = match original.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => {
                return Err(VersionRangeError::invalid_range(
                    original,
                    "missing closing bracket",
                ))
            }
        };
        let inner = original[1..original.len() - 1].trim();

        let bound = |s: &str| -> Result<Option<PackageVersion>, VersionRangeError> {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                PackageVersion::parse(s).map(Some)
            }
        };

        let (min, max) = match inner.split_once(',') {
            Some((lower, upper)) => {
                if upper.contains(',') {
                    return Err(VersionRangeError::invalid_range(original, "too many bounds"));
                }
                (bound(lower)?, bound(upper)?)
            }
            None => {
                // `[1.0]` is the only single-bound interval form
                if !(include_min && include_max) || inner.is_empty() {
                    return Err(VersionRangeError::invalid_range(
                        original,
                        "single version intervals must be inclusive",
                    ));
                }
                let version = PackageVersion::parse(inner)?;
                return Ok(Self::exact(version));
            }
        };

        if min.is_none() && max.is_none() {
            if include_min || include_max {
                return Err(VersionRangeError::invalid_range(original, "no bounds"));
            }
            return Ok(Self::all());
        }

        if let (Some(lo), Some(hi)) = (&min, &max) {
            match lo.cmp(hi) {
                Ordering::Greater => {
                    return Err(VersionRangeError::invalid_range(
                        original,
                        "minimum is greater than maximum",
                    ))
                }
                Ordering::Equal if !(include_min && include_max) => {
                    return Err(VersionRangeError::invalid_range(
                        original,
                        "empty range",
                    ))
                }
                _ => {}
            }
        }

        Ok(Self {
            include_min: include_min && min.is_some(),
            include_max: include_max && max.is_some(),
            min,
            max,
        })
    }

    /// Returns true for the unbounded range
    pub fn is_all(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// The effective minimum version, or none for an unbounded lower end
    pub fn min_version(&self) -> Option<&PackageVersion> {
        self.min.as_ref()
    }

    /// Normalized interval notation, e.g. `[1.0.0, )`
    pub fn to_normalized_string(&self) -> String {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) if min == max => format!("[{}]", min),
            _ => {
                let open = if self.include_min { '[' } else { '(' };
                let close = if self.include_max { ']' } else { ')' };
                let lower = self.min.as_ref().map(|v| v.to_string()).unwrap_or_default();
                let upper = self.max.as_ref().map(|v| v.to_string()).unwrap_or_default();
                format!("{}{}, {}{}", open, lower, upper, close)
            }
        }
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_normalized_string())
    }
}

impl FromStr for VersionRange {
    type Err = VersionRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionRangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VersionRange::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.to_normalized_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    #[test]
    fn test_version_padding() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
        assert_eq!(v("1.0").to_string(), "1.0.0");
        assert_eq!(v("1.2.3.4").to_string(), "1.2.3.4");
    }

    #[test]
    fn test_version_prerelease() {
        assert!(v("1.0.0-beta") < v("1.0.0"));
        assert_eq!(v("1.0.0-Beta"), v("1.0.0-beta"));
        assert_eq!(v("1.0.0-Beta").to_string(), "1.0.0-beta");
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));
    }

    #[test]
    fn test_version_metadata_ignored() {
        assert_eq!(v("1.0.0+sha.abc"), v("1.0.0"));
    }

    #[test]
    fn test_version_ordering() {
        assert!(v("1.0.0") < v("1.0.0.1"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("2.0") > v("1.99.99"));
    }

    #[test]
    fn test_version_invalid() {
        assert_eq!(PackageVersion::parse(""), Err(VersionRangeError::Empty));
        assert!(PackageVersion::parse("abc").is_err());
        assert!(PackageVersion::parse("1.0.0.0.0").is_err());
        assert!(PackageVersion::parse("1..0").is_err());
    }

    #[test]
    fn test_range_bare_is_minimum() {
        let range = r("1.0.0");
        assert_eq!(range.min_version(), Some(&v("1.0.0")));
        assert!(range.max.is_none());
        assert_eq!(range.to_string(), "[1.0.0, )");
    }

    #[test]
    fn test_range_equivalent_forms_collapse() {
        assert_eq!(r("1.0.0"), r("[1.0.0, )"));
        assert_eq!(r("1.0"), r("[1.0.0, )"));
    }

    #[test]
    fn test_range_exact() {
        let range = r("[1.2.3]");
        assert_eq!(range.to_string(), "[1.2.3]");
        assert_eq!(range.min_version(), Some(&v("1.2.3")));
    }

    #[test]
    fn test_range_interval() {
        let range = r("[1.0, 2.0)");
        assert_eq!(range.min_version(), Some(&v("1.0.0")));
        assert!(!range.include_max);
        assert_eq!(range.to_string(), "[1.0.0, 2.0.0)");

        let range = r("(, 2.0]");
        assert!(range.min_version().is_none());
        assert_eq!(range.max, Some(v("2.0.0")));
        assert_eq!(range.to_string(), "(, 2.0.0]");
    }

    #[test]
    fn test_range_floating() {
        let range = r("1.*");
        assert_eq!(range.to_string(), "[1.0.0, )");
        assert_eq!(range.min_version(), Some(&v("1.0.0")));

        let range = r("*");
        assert_eq!(range.min_version(), Some(&v("0.0.0")));
    }

    #[test]
    fn test_range_invalid() {
        assert_eq!(VersionRange::parse(""), Err(VersionRangeError::Empty));
        assert!(VersionRange::parse("[1.0").is_err());
        assert!(VersionRange::parse("(1.0)").is_err());
        assert!(VersionRange::parse("[2.0, 1.0]").is_err());
        assert!(VersionRange::parse("[1.0, 1.0)").is_err());
        assert!(VersionRange::parse("[,]").is_err());
        assert!(VersionRange::parse("not-a-version").is_err());
    }

    #[test]
    fn test_range_all() {
        let all = VersionRange::all();
        assert!(all.is_all());
        assert!(all.min_version().is_none());
        assert_eq!(all.to_string(), "(, )");
        assert_eq!(VersionRange::default(), all);
        assert_eq!(r("(, )"), all);
    }

    #[test]
    fn test_serde_range() {
        let json = serde_json::to_string(&r("1.0.0")).unwrap();
        assert_eq!(json, "\"[1.0.0, )\"");
        let parsed: VersionRange = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r("1.0.0"));

        let json = serde_json::to_string(&VersionRange::all()).unwrap();
        let parsed: VersionRange = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_all());
    }
}
