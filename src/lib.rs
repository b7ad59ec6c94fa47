//! dgrestore - Restore-request aggregation library
//!
//! This library folds restore nominations from many independent callers
//! into a canonical, deduplicated dependency graph:
//! - Reference normalization and per-framework aggregation
//! - Cross-framework deduplication of package and project references
//! - A project cache with stale-write rejection
//! - A single-flight restore-unit cache (one execution per identity)
//! - Deterministic graph assembly and diagnostic dumps

pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod nomination;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod restore;
pub mod workspace;
