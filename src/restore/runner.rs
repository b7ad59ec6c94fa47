//! Batch restore of an assembled graph

use super::{RestoreEngine, RestoreResult};
use crate::cache::RestoreUnitCache;
use crate::graph::DependencyGraphDescription;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Restores every unit of a graph through a deduplication cache
pub struct RestoreRunner {
    cache: Arc<RestoreUnitCache>,
}

impl RestoreRunner {
    /// Create a runner over a fresh cache for `engine`
    pub fn new(engine: Arc<dyn RestoreEngine>, max_concurrency: usize) -> Self {
        Self {
            cache: Arc::new(RestoreUnitCache::with_concurrency(engine, max_concurrency)),
        }
    }

    /// Create a runner over an existing cache
    pub fn with_cache(cache: Arc<RestoreUnitCache>) -> Self {
        Self { cache }
    }

    /// The underlying deduplication cache
    pub fn cache(&self) -> &Arc<RestoreUnitCache> {
        &self.cache
    }

    /// Restore every unit and return exactly one result per identity, in
    /// graph unit order. Results memoized by an earlier run are dropped
    /// first, so a renominated project is restored again.
    pub async fn run(&self, graph: &DependencyGraphDescription) -> Vec<RestoreResult> {
        self.cache.evict_completed();

        let mut pending = Vec::with_capacity(graph.units.len());
        for unit in &graph.units {
            let Some(spec) = graph.project(&unit.root) else {
                warn!(root = %unit.root, "restore root missing from graph projects");
                continue;
            };
            let spec = Arc::new(spec.clone());
            let mut identity = None;
            for requester in &unit.requested_by {
                identity = Some(self.cache.submit_from(requester.clone(), Arc::clone(&spec)));
            }
            if let Some(identity) = identity {
                pending.push(identity);
            }
        }
        debug!(units = pending.len(), "restoring units");

        let cache = &self.cache;
        join_all(pending.into_iter().map(|identity| async move {
            let output = cache.wait(&identity).await;
            let requested_by = cache.requesters(&identity);
            RestoreResult::from_output(identity, requested_by, &output)
        }))
        .await
    }
}

/// Restore every unit of `graph` with `engine`
pub async fn run_restore(
    engine: Arc<dyn RestoreEngine>,
    graph: &DependencyGraphDescription,
    max_concurrency: usize,
) -> Vec<RestoreResult> {
    RestoreRunner::new(engine, max_concurrency).run(graph).await
}
