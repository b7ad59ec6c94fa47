//! Caches shared across nominations and restores
//!
//! This module provides:
//! - The project cache: latest restore spec per project, with stale-write
//!   rejection
//! - The restore-unit deduplication cache: one execution per unit identity

mod project_cache;
mod restore_units;

pub use project_cache::{InMemoryProjectCache, ProjectSystemCache};
pub use restore_units::{RestoreUnitCache, DEFAULT_CONCURRENCY};
