//! Project restore specifications
//!
//! A `ProjectRestoreSpec` is built fresh on every nomination and is never
//! mutated once handed to the project cache.

use super::{DependencyRecord, Framework, PackageReference, ProjectReference};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the restore engine treats a spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestoreOutputType {
    /// A project restored in place (lock file under its output path)
    #[default]
    NetCore,
    /// An ad-hoc tool restored into the shared tools folder
    DotnetCliTool,
}

/// Dependencies declared under one target framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkSpec {
    /// The framework
    pub framework: Framework,
    /// Package dependencies first, then project dependencies, each in declaration order
    pub dependencies: Vec<DependencyRecord>,
}

impl TargetFrameworkSpec {
    /// Creates an empty framework spec
    pub fn new(framework: Framework) -> Self {
        Self {
            framework,
            dependencies: Vec::new(),
        }
    }

    /// Returns package dependencies only
    pub fn packages(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.dependencies.iter().filter(|d| d.is_package())
    }
}

/// Restore metadata of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreMetadata {
    /// Unique name of the project within the workspace
    pub project_unique_name: String,
    /// Short display name
    pub project_name: String,
    /// Project file path
    pub project_path: String,
    /// Intermediate output folder (lock files, diagnostic dumps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Restore flavor
    pub output_type: RestoreOutputType,
    /// Short folder names of the declared frameworks, in declaration order
    pub original_target_frameworks: Vec<String>,
}

/// Everything the resolution engine needs to restore one project or tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreSpec {
    /// Display name
    pub name: String,
    /// Project file path
    pub file_path: String,
    /// Restore metadata
    pub restore_metadata: RestoreMetadata,
    /// Per-framework dependency sets
    pub frameworks: Vec<TargetFrameworkSpec>,
    /// Identity-level package references, one per package id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_references: Vec<PackageReference>,
    /// Identity-level project references, one per project path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_references: Vec<ProjectReference>,
    /// Tool restore specs requested by this project
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_references: Vec<ProjectRestoreSpec>,
}

impl ProjectRestoreSpec {
    /// Creates a spec from its framework sets
    pub fn new(frameworks: Vec<TargetFrameworkSpec>) -> Self {
        Self {
            frameworks,
            ..Self::default()
        }
    }

    /// Unique name used as the graph key
    pub fn unique_name(&self) -> &str {
        &self.restore_metadata.project_unique_name
    }

    /// Returns true for tool restore specs
    pub fn is_tool(&self) -> bool {
        self.restore_metadata.output_type == RestoreOutputType::DotnetCliTool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionRange;

    fn net45() -> Framework {
        Framework::parse("net45").unwrap()
    }

    #[test]
    fn test_framework_spec_partitions() {
        let mut tfm = TargetFrameworkSpec::new(net45());
        tfm.dependencies
            .push(DependencyRecord::package("a", VersionRange::all()));
        tfm.dependencies.push(DependencyRecord::project("b", None));
        assert_eq!(tfm.packages().count(), 1);
        assert_eq!(tfm.dependencies.len(), 2);
    }

    #[test]
    fn test_spec_is_not_a_tool_by_default() {
        let spec = ProjectRestoreSpec::new(vec![TargetFrameworkSpec::new(net45())]);
        assert_eq!(spec.frameworks[0].framework, net45());
        assert!(!spec.is_tool());
    }

    #[test]
    fn test_serde_spec_round_trip() {
        let mut spec = ProjectRestoreSpec::new(vec![TargetFrameworkSpec::new(net45())]);
        spec.name = "x".to_string();
        spec.restore_metadata.project_unique_name = "C:\\x\\x.csproj".to_string();
        spec.restore_metadata.original_target_frameworks = vec!["net45".to_string()];
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"outputType\":\"netCore\""));
        assert!(!json.contains("toolReferences"));
        let parsed: ProjectRestoreSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
