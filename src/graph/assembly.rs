//! Dependency graph assembly
//!
//! Builds a deterministic `DependencyGraphDescription` from cached specs:
//! the same set of specs always yields the same description, whatever order
//! they were nominated in.

use crate::domain::ProjectRestoreSpec;
use crate::restore::{RestoreResult, RestoreUnitIdentity};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Format version of the serialized description
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Outcome of a unit attached to the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatus {
    /// Whether the restore succeeded
    pub success: bool,
    /// Lock file produced on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_file_path: Option<PathBuf>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RestoreResult> for UnitStatus {
    fn from(result: &RestoreResult) -> Self {
        Self {
            success: result.success,
            lock_file_path: result.lock_file_path.clone(),
            error: result.error.clone(),
        }
    }
}

/// One unique restore unit and the callers that need it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreUnitEntry {
    /// Deduplication key
    pub identity: RestoreUnitIdentity,
    /// Representative root whose spec is restored
    pub root: String,
    /// Every root mapping to this identity, sorted
    pub roots: Vec<String>,
    /// Projects that asked for this unit, sorted. A project root requests
    /// itself; a tool root is requested by the projects declaring the tool.
    pub requested_by: Vec<String>,
    /// Restore outcome, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<UnitStatus>,
}

/// Canonical graph handed to the resolution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraphDescription {
    /// Format version
    pub format: u32,
    /// Unique names of the restore roots, sorted
    pub restore: Vec<String>,
    /// Unique specs, sorted by unique name
    pub projects: Vec<ProjectRestoreSpec>,
    /// One entry per unique restore unit identity
    pub units: Vec<RestoreUnitEntry>,
}

impl DependencyGraphDescription {
    /// Find a project spec by unique name (case-insensitive)
    pub fn project(&self, unique_name: &str) -> Option<&ProjectRestoreSpec> {
        self.projects
            .iter()
            .find(|p| p.unique_name().eq_ignore_ascii_case(unique_name))
    }

    /// Find the unit entry of an identity
    pub fn unit(&self, identity: &RestoreUnitIdentity) -> Option<&RestoreUnitEntry> {
        self.units.iter().find(|u| &u.identity == identity)
    }

    /// Returns true if there is nothing to restore
    pub fn is_empty(&self) -> bool {
        self.restore.is_empty()
    }
}

/// Incremental builder for a `DependencyGraphDescription`
///
/// Tool references of restore roots become roots of their own. Projects
/// declaring the same tool share one tool spec; the one with the smallest
/// calling project path represents them all.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    projects: BTreeMap<String, Arc<ProjectRestoreSpec>>,
    restore: Vec<String>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec; a later spec with the same unique name replaces it
    pub fn add_project(&mut self, spec: impl Into<Arc<ProjectRestoreSpec>>) -> &mut Self {
        let spec = spec.into();
        self.projects.insert(spec.unique_name().to_lowercase(), spec);
        self
    }

    /// Mark a project as a restore root
    pub fn add_restore(&mut self, unique_name: impl Into<String>) -> &mut Self {
        self.restore.push(unique_name.into());
        self
    }

    /// Add a spec and mark it as a restore root
    pub fn add_root(&mut self, spec: Arc<ProjectRestoreSpec>) -> &mut Self {
        self.add_restore(spec.unique_name().to_string());
        self.add_project(spec)
    }

    /// Build the description, attaching any known results by identity
    pub fn build(&self, results: &[RestoreResult]) -> DependencyGraphDescription {
        let mut specs = self.projects.clone();
        // root key -> (display name, requesting projects)
        let mut roots: BTreeMap<String, (String, BTreeSet<String>)> = BTreeMap::new();

        for name in &self.restore {
            let key = name.to_lowercase();
            let Some(spec) = self.projects.get(&key) else {
                warn!(root = %name, "restore root has no project spec, dropping");
                continue;
            };
            let caller = spec.unique_name().to_string();
            roots
                .entry(key)
                .or_insert_with(|| (caller.clone(), BTreeSet::new()))
                .1
                .insert(caller.clone());

            for tool in &spec.tool_references {
                let tool_key = tool.unique_name().to_lowercase();
                match specs.entry(tool_key.clone()) {
                    Entry::Vacant(entry) => {
                        entry.insert(Arc::new(tool.clone()));
                    }
                    Entry::Occupied(mut entry) => {
                        let current = entry.get();
                        if current.is_tool()
                            && tool.restore_metadata.project_path < current.restore_metadata.project_path
                        {
                            entry.insert(Arc::new(tool.clone()));
                        }
                    }
                }
                roots
                    .entry(tool_key)
                    .or_insert_with(|| (tool.unique_name().to_string(), BTreeSet::new()))
                    .1
                    .insert(caller.clone());
            }
        }

        let statuses: HashMap<&RestoreUnitIdentity, UnitStatus> = results
            .iter()
            .map(|r| (&r.identity, UnitStatus::from(r)))
            .collect();

        let mut units: Vec<RestoreUnitEntry> = Vec::new();
        let mut index: HashMap<RestoreUnitIdentity, usize> = HashMap::new();
        for (key, (root, callers)) in &roots {
            let Some(spec) = specs.get(key) else {
                continue;
            };
            let identity = RestoreUnitIdentity::of(spec);
            let i = *index.entry(identity.clone()).or_insert_with(|| {
                units.push(RestoreUnitEntry {
                    result: statuses.get(&identity).cloned(),
                    identity,
                    root: root.clone(),
                    roots: Vec::new(),
                    requested_by: Vec::new(),
                });
                units.len() - 1
            });
            units[i].roots.push(root.clone());
            units[i].requested_by.extend(callers.iter().cloned());
        }
        for unit in &mut units {
            unit.requested_by.sort();
            unit.requested_by.dedup();
        }

        DependencyGraphDescription {
            format: GRAPH_FORMAT_VERSION,
            restore: roots.into_values().map(|(name, _)| name).collect(),
            projects: specs.values().map(|spec| restorable(spec)).collect(),
            units,
        }
    }
}

/// Copy of `spec` ready for the engine: frameworks in canonical order and
/// project dependencies without a path dropped, since they cannot be resolved
fn restorable(spec: &ProjectRestoreSpec) -> ProjectRestoreSpec {
    let mut spec = spec.clone();
    let project = spec.unique_name().to_string();
    spec.frameworks.sort_by(|a, b| a.framework.cmp(&b.framework));
    for tfm in &mut spec.frameworks {
        tfm.dependencies.retain(|dependency| {
            if !dependency.is_resolvable() {
                debug!(project = %project, reference = %dependency.name, "unresolved project reference excluded");
                return false;
            }
            true
        });
    }
    spec.project_references
        .retain(|reference| reference.project_path.is_some());
    spec
}

/// Assemble a graph where every spec and its tools are restore roots
pub fn assemble(
    specs: impl IntoIterator<Item = Arc<ProjectRestoreSpec>>,
    results: &[RestoreResult],
) -> DependencyGraphDescription {
    let mut builder = GraphBuilder::new();
    for spec in specs {
        builder.add_root(spec);
    }
    builder.build(results)
}
