//! Workspace project lookup
//!
//! The host owns the list of loaded projects; nominations for projects it
//! does not know about are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Names of a project loaded in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNames {
    /// Full path of the project file
    pub full_name: String,
    /// Unique name within the workspace
    pub unique_name: String,
    /// Short display name
    pub short_name: String,
}

impl ProjectNames {
    /// Create project names
    pub fn new(
        full_name: impl Into<String>,
        unique_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            unique_name: unique_name.into(),
            short_name: short_name.into(),
        }
    }

    /// Derive names from a project file path: the path is also the unique
    /// name and the file stem is the short name
    pub fn from_path(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let short_name = Path::new(&full_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| full_name.clone());
        Self {
            unique_name: full_name.clone(),
            full_name,
            short_name,
        }
    }

    /// Directory containing the project file
    pub fn project_directory(&self) -> PathBuf {
        Path::new(&self.full_name)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Normalized output path for a base intermediate path.
    /// Absolute intermediate paths replace the project directory.
    pub fn output_path(&self, base_intermediate_path: &str) -> PathBuf {
        normalize_path(&self.project_directory().join(base_intermediate_path))
    }
}

/// Read-only lookup of workspace projects
pub trait ProjectLookup: Send + Sync {
    /// Find a project by unique name
    fn lookup(&self, project_unique_name: &str) -> Option<ProjectNames>;
}

/// Lookup over a fixed set of projects, matching unique or full names
/// case-insensitively
#[derive(Debug, Clone, Default)]
pub struct StaticProjectLookup {
    projects: HashMap<String, ProjectNames>,
}

impl StaticProjectLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project (builder pattern)
    pub fn with_project(mut self, names: ProjectNames) -> Self {
        self.insert(names);
        self
    }

    /// Add a project; a later entry with the same name replaces the earlier one
    pub fn insert(&mut self, names: ProjectNames) {
        self.projects
            .insert(names.full_name.to_lowercase(), names.clone());
        self.projects.insert(names.unique_name.to_lowercase(), names);
    }
}

impl FromIterator<ProjectNames> for StaticProjectLookup {
    fn from_iter<I: IntoIterator<Item = ProjectNames>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for names in iter {
            lookup.insert(names);
        }
        lookup
    }
}

impl ProjectLookup for StaticProjectLookup {
    fn lookup(&self, project_unique_name: &str) -> Option<ProjectNames> {
        self.projects.get(&project_unique_name.to_lowercase()).cloned()
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. The file system is never consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folded = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if folded {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
