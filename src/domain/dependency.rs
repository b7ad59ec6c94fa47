//! Normalized dependency records and identity-level references

use super::{Framework, PackageVersion, VersionRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a dependency record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// A package resolved from a package source
    Package,
    /// Another project in the workspace
    ExternalProject,
}

/// A normalized, owned dependency of one target framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Package id or project unique name
    pub name: String,
    /// Accepted versions; always `all` for projects
    pub version_range: VersionRange,
    /// Package or project
    pub kind: DependencyKind,
    /// Absolute project path, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DependencyRecord {
    /// Creates a package dependency
    pub fn package(name: impl Into<String>, version_range: VersionRange) -> Self {
        Self {
            name: name.into(),
            version_range,
            kind: DependencyKind::Package,
            path: None,
        }
    }

    /// Creates a project dependency; projects never carry a version constraint
    pub fn project(name: impl Into<String>, path: Option<String>) -> Self {
        Self {
            name: name.into(),
            version_range: VersionRange::all(),
            kind: DependencyKind::ExternalProject,
            path,
        }
    }

    /// Returns true for package dependencies
    pub fn is_package(&self) -> bool {
        self.kind == DependencyKind::Package
    }

    /// Returns false for project dependencies without a path; those cannot
    /// be resolved and are excluded from restore
    pub fn is_resolvable(&self) -> bool {
        match self.kind {
            DependencyKind::Package => true,
            DependencyKind::ExternalProject => self.path.is_some(),
        }
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DependencyKind::Package => write!(f, "{} {}", self.name, self.version_range),
            DependencyKind::ExternalProject => match &self.path {
                Some(path) => write!(f, "{} (project: {})", self.name, path),
                None => write!(f, "{} (project: unresolved)", self.name),
            },
        }
    }
}

/// A package id plus the effective minimum version of its range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageIdentity {
    /// Package id as declared
    pub id: String,
    /// Effective minimum version, none for unbounded ranges
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "version_string"
    )]
    pub version: Option<PackageVersion>,
}

impl PackageIdentity {
    /// Creates a package identity
    pub fn new(id: impl Into<String>, version: Option<PackageVersion>) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Case-insensitive grouping key for the id
    pub fn key(&self) -> String {
        self.id.to_lowercase()
    }
}

/// A package reference pinned to the framework that declared it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageReference {
    /// Id and effective minimum version
    pub identity: PackageIdentity,
    /// Declaring framework
    pub target_framework: Framework,
}

impl PackageReference {
    /// Creates a package reference
    pub fn new(identity: PackageIdentity, target_framework: Framework) -> Self {
        Self {
            identity,
            target_framework,
        }
    }
}

/// A reference to another project in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    /// Referenced project unique name
    pub project_unique_name: String,
    /// Referenced project's absolute path, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
}

impl ProjectReference {
    /// Creates a project reference
    pub fn new(project_unique_name: impl Into<String>, project_path: Option<String>) -> Self {
        Self {
            project_unique_name: project_unique_name.into(),
            project_path,
        }
    }
}

mod version_string {
    use crate::domain::PackageVersion;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        version: &Option<PackageVersion>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match version {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PackageVersion>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| PackageVersion::parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
