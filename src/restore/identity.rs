//! Restore unit identity
//!
//! Two restore units with the same identity produce the same lock file, so
//! the deduplication cache executes at most one of them.

use crate::domain::{Framework, ProjectRestoreSpec, VersionRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deduplication key of a restore unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RestoreUnitIdentity {
    /// An ad-hoc tool, keyed by id, effective minimum version and framework
    Tool {
        /// Package id, lower-cased
        id: String,
        /// Normalized minimum version; `None` when the range has no lower bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        /// Framework short folder name
        framework: String,
    },
    /// A project, keyed by its path
    Project {
        /// Project path, lower-cased
        path: String,
    },
}

impl RestoreUnitIdentity {
    /// Identity of a tool restore. Ranges with the same lower bound collapse.
    pub fn tool(id: &str, range: &VersionRange, framework: &Framework) -> Self {
        RestoreUnitIdentity::Tool {
            id: id.to_lowercase(),
            version: range.min_version().map(|v| v.to_normalized_string()),
            framework: framework.short_folder_name(),
        }
    }

    /// Identity of a project restore
    pub fn project(path: &str) -> Self {
        RestoreUnitIdentity::Project {
            path: path.to_lowercase(),
        }
    }

    /// Derive the identity of a restore spec.
    ///
    /// Tool specs are keyed by their single package dependency; a tool spec
    /// without one is treated as a project. Projects fall back to the unique
    /// name when no path is recorded.
    pub fn of(spec: &ProjectRestoreSpec) -> Self {
        if spec.is_tool() {
            let tool = spec.frameworks.first().and_then(|tfm| {
                tfm.packages()
                    .next()
                    .map(|dep| Self::tool(&dep.name, &dep.version_range, &tfm.framework))
            });
            if let Some(identity) = tool {
                return identity;
            }
        }

        let path = &spec.restore_metadata.project_path;
        if path.is_empty() {
            Self::project(spec.unique_name())
        } else {
            Self::project(path)
        }
    }

    /// Returns true for tool units
    pub fn is_tool(&self) -> bool {
        matches!(self, RestoreUnitIdentity::Tool { .. })
    }
}

impl fmt::Display for RestoreUnitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreUnitIdentity::Tool {
                id,
                version,
                framework,
            } => match version {
                Some(version) => write!(f, "tool {} {} ({})", id, version, framework),
                None => write!(f, "tool {} * ({})", id, framework),
            },
            RestoreUnitIdentity::Project { path } => write!(f, "project {}", path),
        }
    }
}
