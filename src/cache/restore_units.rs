//! Restore-unit deduplication cache
//!
//! A single-flight registry keyed by `RestoreUnitIdentity`:
//! - the first submission for an identity becomes its representative
//! - the first waiter starts the one execution, later waiters attach to it
//! - completed outputs are memoized and fanned out to every waiter until
//!   `evict_completed` drops them
//! - an execution nobody waits on any more is dropped, and the next waiter
//!   starts a fresh one

use crate::domain::ProjectRestoreSpec;
use crate::error::RestoreError;
use crate::restore::{RestoreEngine, RestoreUnitIdentity, UnitOutput};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Default number of concurrent restore executions
pub const DEFAULT_CONCURRENCY: usize = 10;

type UnitFuture = BoxFuture<'static, UnitOutput>;

enum Flight {
    Idle,
    InFlight(WeakShared<UnitFuture>),
    Done(UnitOutput),
}

struct UnitSlot {
    representative: Arc<ProjectRestoreSpec>,
    requesters: Vec<String>,
    flight: Flight,
}

/// Single-flight registry of restore units
pub struct RestoreUnitCache {
    engine: Arc<dyn RestoreEngine>,
    permits: Arc<Semaphore>,
    slots: DashMap<RestoreUnitIdentity, UnitSlot>,
    executions: AtomicUsize,
}

impl RestoreUnitCache {
    /// Create a cache with the default concurrency limit
    pub fn new(engine: Arc<dyn RestoreEngine>) -> Self {
        Self::with_concurrency(engine, DEFAULT_CONCURRENCY)
    }

    /// Create a cache allowing `limit` concurrent executions (at least one)
    pub fn with_concurrency(engine: Arc<dyn RestoreEngine>, limit: usize) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(limit.max(1))),
            slots: DashMap::new(),
            executions: AtomicUsize::new(0),
        }
    }

    /// Register a unit on behalf of its own project path
    pub fn submit(&self, unit: ProjectRestoreSpec) -> RestoreUnitIdentity {
        let requester = if unit.restore_metadata.project_path.is_empty() {
            unit.unique_name().to_string()
        } else {
            unit.restore_metadata.project_path.clone()
        };
        self.submit_from(requester, unit)
    }

    /// Register a unit on behalf of `requester`. Idempotent per identity.
    pub fn submit_from(
        &self,
        requester: impl Into<String>,
        unit: impl Into<Arc<ProjectRestoreSpec>>,
    ) -> RestoreUnitIdentity {
        let unit = unit.into();
        let requester = requester.into();
        let identity = RestoreUnitIdentity::of(&unit);

        self.slots
            .entry(identity.clone())
            .and_modify(|slot| {
                debug!(unit = %identity, requester = %requester, "restore unit deduplicated");
                slot.requesters.push(requester.clone());
            })
            .or_insert_with(|| UnitSlot {
                representative: Arc::clone(&unit),
                requesters: vec![requester.clone()],
                flight: Flight::Idle,
            });

        identity
    }

    /// Wait for the unit's result, starting its execution if nobody has
    pub async fn wait(&self, identity: &RestoreUnitIdentity) -> UnitOutput {
        let flight = {
            let Some(mut slot) = self.slots.get_mut(identity) else {
                return Err(Arc::new(RestoreError::unknown_unit(identity.to_string())));
            };

            let attached = match &slot.flight {
                Flight::Done(output) => return output.clone(),
                Flight::InFlight(weak) => weak.upgrade(),
                Flight::Idle => None,
            };

            match attached {
                Some(shared) => {
                    debug!(unit = %identity, "attaching to in-flight restore");
                    shared
                }
                None => {
                    let shared = self.launch(identity, Arc::clone(&slot.representative));
                    if let Some(weak) = shared.downgrade() {
                        slot.flight = Flight::InFlight(weak);
                    }
                    shared
                }
            }
        };

        let output = flight.await;

        if let Some(mut slot) = self.slots.get_mut(identity) {
            if !matches!(slot.flight, Flight::Done(_)) {
                slot.flight = Flight::Done(output.clone());
            }
        }
        output
    }

    /// Submit a unit and wait for its result
    pub async fn restore(&self, unit: ProjectRestoreSpec) -> UnitOutput {
        let identity = self.submit(unit);
        self.wait(&identity).await
    }

    fn launch(
        &self,
        identity: &RestoreUnitIdentity,
        unit: Arc<ProjectRestoreSpec>,
    ) -> Shared<UnitFuture> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let engine = Arc::clone(&self.engine);
        let permits = Arc::clone(&self.permits);
        let label = identity.to_string();

        async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| Arc::new(RestoreError::failed(&label, "restore queue closed")))?;
            debug!(unit = %label, engine = engine.name(), "executing restore unit");
            engine.restore(&unit).await.map_err(Arc::new)
        }
        .boxed()
        .shared()
    }

    /// Every requester recorded for an identity, in submission order
    pub fn requesters(&self, identity: &RestoreUnitIdentity) -> Vec<String> {
        self.slots
            .get(identity)
            .map(|slot| slot.requesters.clone())
            .unwrap_or_default()
    }

    /// The representative description of an identity
    pub fn representative(&self, identity: &RestoreUnitIdentity) -> Option<Arc<ProjectRestoreSpec>> {
        self.slots
            .get(identity)
            .map(|slot| Arc::clone(&slot.representative))
    }

    /// Memoized output of an identity, if its execution completed
    pub fn completed(&self, identity: &RestoreUnitIdentity) -> Option<UnitOutput> {
        self.slots.get(identity).and_then(|slot| match &slot.flight {
            Flight::Done(output) => Some(output.clone()),
            _ => None,
        })
    }

    /// Drop every completed slot with its memoized output and requesters.
    /// In-flight and not yet started units are kept. Returns the number of
    /// slots dropped.
    pub fn evict_completed(&self) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| !matches!(slot.flight, Flight::Done(_)));
        let evicted = before.saturating_sub(self.slots.len());
        if evicted > 0 {
            debug!(evicted, "evicted completed restore units");
        }
        evicted
    }

    /// Number of executions started so far
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Number of unique identities registered
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing has been submitted
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
