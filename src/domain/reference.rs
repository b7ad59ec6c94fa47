//! Raw reference items as supplied by a nominating caller

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known property holding a package version range
pub const VERSION_PROPERTY: &str = "Version";

/// Well-known property holding a referenced project's absolute path
pub const PROJECT_PATH_PROPERTY: &str = "ProjectFileFullPath";

/// Well-known property holding a tool reference's target framework
pub const TARGET_FRAMEWORK_PROPERTY: &str = "TargetFramework";

/// Open property bag attached to a reference item.
/// Keys are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceProperties(BTreeMap<String, String>);

impl ReferenceProperties {
    /// Create an empty property bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a property by name; unknown keys yield `None`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Number of properties in the bag
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the bag holds no properties
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A raw package, project or tool reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    /// Package id or project unique name
    pub name: String,
    /// Property bag; may be absent entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ReferenceProperties>,
}

impl ReferenceItem {
    /// Create a reference without a property bag
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: None,
        }
    }

    /// Create a package reference carrying a `Version` property
    pub fn package(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name).with_property(VERSION_PROPERTY, version)
    }

    /// Create a project reference carrying a `ProjectFileFullPath` property
    pub fn project(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).with_property(PROJECT_PATH_PROPERTY, path)
    }

    /// Add a property, creating the bag if needed (builder pattern)
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let bag = self.properties.take().unwrap_or_default();
        self.properties = Some(bag.with(key, value));
        self
    }

    /// Typed property lookup; a missing bag or unknown key yields `None`
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.as_ref().and_then(|bag| bag.get(key))
    }
}
