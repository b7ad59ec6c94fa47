//! Inbound nomination payload

use crate::domain::ReferenceItem;
use serde::{Deserialize, Serialize};

/// References declared under one target framework
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkInfo {
    /// Short or long target framework moniker
    #[serde(alias = "moniker")]
    pub target_framework_moniker: String,
    /// Package references, in declaration order
    #[serde(default)]
    pub package_references: Vec<ReferenceItem>,
    /// Project references, in declaration order
    #[serde(default)]
    pub project_references: Vec<ReferenceItem>,
}

impl TargetFrameworkInfo {
    /// Create a framework entry without references
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            target_framework_moniker: moniker.into(),
            ..Self::default()
        }
    }

    /// Add a package reference (builder pattern)
    pub fn with_package(mut self, item: ReferenceItem) -> Self {
        self.package_references.push(item);
        self
    }

    /// Add a project reference (builder pattern)
    pub fn with_project(mut self, item: ReferenceItem) -> Self {
        self.project_references.push(item);
        self
    }
}

/// A project's full dependency state for one restore cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreInfo {
    /// Intermediate output folder, relative to the project directory
    #[serde(default)]
    pub base_intermediate_path: String,
    /// Declared target frameworks; `None` is an invalid nomination
    #[serde(default)]
    pub target_frameworks: Option<Vec<TargetFrameworkInfo>>,
    /// Ad-hoc tool references
    #[serde(default)]
    pub tool_references: Vec<ReferenceItem>,
}

impl ProjectRestoreInfo {
    /// Create restore info from declared frameworks
    pub fn new(target_frameworks: Vec<TargetFrameworkInfo>) -> Self {
        Self {
            base_intermediate_path: "obj".to_string(),
            target_frameworks: Some(target_frameworks),
            tool_references: Vec::new(),
        }
    }

    /// Set the intermediate output folder (builder pattern)
    pub fn with_base_intermediate_path(mut self, path: impl Into<String>) -> Self {
        self.base_intermediate_path = path.into();
        self
    }

    /// Add a tool reference (builder pattern)
    pub fn with_tool(mut self, item: ReferenceItem) -> Self {
        self.tool_references.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"targetFrameworks":[{"moniker":"netcoreapp1.0","packageReferences":[{"name":"a"}]}]}"#;
        let info: ProjectRestoreInfo = serde_json::from_str(json).unwrap();
        let frameworks = info.target_frameworks.unwrap();
        assert_eq!(frameworks[0].target_framework_moniker, "netcoreapp1.0");
        assert_eq!(frameworks[0].package_references.len(), 1);
        assert!(frameworks[0].project_references.is_empty());
        assert!(info.tool_references.is_empty());
    }

    #[test]
    fn test_deserialize_missing_frameworks() {
        let info: ProjectRestoreInfo = serde_json::from_str("{}").unwrap();
        assert!(info.target_frameworks.is_none());
        assert!(info.base_intermediate_path.is_empty());
    }
}
