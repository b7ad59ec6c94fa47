//! Project restore spec cache
//!
//! Holds the latest restore spec of every nominated project as an immutable
//! `Arc` snapshot. Writes swap the whole snapshot atomically per project, so
//! readers see either the old or the new spec.

use crate::domain::ProjectRestoreSpec;
use crate::workspace::ProjectNames;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Store of the latest restore spec per project
pub trait ProjectSystemCache: Send + Sync {
    /// Store a spec produced by the nomination with `generation`.
    /// Returns false when a newer nomination already stored its spec.
    fn add_project_restore_info(
        &self,
        names: &ProjectNames,
        spec: Arc<ProjectRestoreSpec>,
        generation: u64,
    ) -> bool;

    /// The current spec of a project
    fn get_project_restore_info(&self, project_unique_name: &str) -> Option<Arc<ProjectRestoreSpec>>;

    /// Every cached spec, ordered by unique name
    fn snapshot(&self) -> Vec<Arc<ProjectRestoreSpec>>;
}

#[derive(Debug, Clone)]
struct CachedSpec {
    generation: u64,
    spec: Arc<ProjectRestoreSpec>,
}

/// In-memory project cache keyed by lower-cased unique name
#[derive(Debug, Default)]
pub struct InMemoryProjectCache {
    entries: DashMap<String, CachedSpec>,
}

impl InMemoryProjectCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the stored spec for a project
    pub fn generation(&self, project_unique_name: &str) -> Option<u64> {
        self.entries
            .get(&project_unique_name.to_lowercase())
            .map(|entry| entry.generation)
    }

    /// Number of cached projects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no project is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProjectSystemCache for InMemoryProjectCache {
    fn add_project_restore_info(
        &self,
        names: &ProjectNames,
        spec: Arc<ProjectRestoreSpec>,
        generation: u64,
    ) -> bool {
        let cached = CachedSpec { generation, spec };
        match self.entries.entry(names.unique_name.to_lowercase()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get().generation;
                if stored > generation {
                    debug!(
                        project = %names.unique_name,
                        stored,
                        generation,
                        "superseded nomination discarded"
                    );
                    return false;
                }
                entry.insert(cached);
            }
            Entry::Vacant(entry) => {
                entry.insert(cached);
            }
        }
        true
    }

    fn get_project_restore_info(&self, project_unique_name: &str) -> Option<Arc<ProjectRestoreSpec>> {
        self.entries
            .get(&project_unique_name.to_lowercase())
            .map(|entry| Arc::clone(&entry.spec))
    }

    fn snapshot(&self) -> Vec<Arc<ProjectRestoreSpec>> {
        let mut specs: Vec<(String, Arc<ProjectRestoreSpec>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(&entry.value().spec)))
            .collect();
        specs.sort_by(|a, b| a.0.cmp(&b.0));
        specs.into_iter().map(|(_, spec)| spec).collect()
    }
}
