//! Restore units and the engine seam
//!
//! This module provides:
//! - `RestoreUnitIdentity`, the deduplication key of a restore unit
//! - The `RestoreEngine` trait the resolution engine implements
//! - Tool spec construction and tool lock path resolution
//! - `PlanEngine`, which resolves lock paths without touching the disk
//! - `RestoreRunner`, which restores every unit of a graph through the
//!   deduplication cache

mod identity;
mod plan;
mod runner;
mod tool;

pub use identity::RestoreUnitIdentity;
pub use plan::PlanEngine;
pub use runner::{run_restore, RestoreRunner};
pub use tool::{
    tool_spec, tool_unique_name, ToolPathResolver, DEFAULT_TOOL_FRAMEWORK, LOCK_FILE_NAME,
    TOOLS_FOLDER,
};

use crate::domain::ProjectRestoreSpec;
use crate::error::RestoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Trait for resolution engines
#[async_trait]
pub trait RestoreEngine: Send + Sync {
    /// Engine name for diagnostics
    fn name(&self) -> &'static str;

    /// Restore one unit and report where its lock file lives
    async fn restore(&self, unit: &ProjectRestoreSpec) -> Result<RestoreOutcome, RestoreError>;
}

/// Successful restore of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    /// Lock file produced for the unit
    pub lock_file_path: PathBuf,
}

impl RestoreOutcome {
    /// Create an outcome for a lock file path
    pub fn new(lock_file_path: impl Into<PathBuf>) -> Self {
        Self {
            lock_file_path: lock_file_path.into(),
        }
    }
}

/// Output of a single-flight execution, shared by every waiter
pub type UnitOutput = Result<RestoreOutcome, Arc<RestoreError>>;

/// Per-identity restore result, fanned out to every requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResult {
    /// Identity of the restored unit
    pub identity: RestoreUnitIdentity,
    /// Whether the restore succeeded
    pub success: bool,
    /// Lock file produced on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_file_path: Option<PathBuf>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every root that requested this unit, duplicates included
    pub requested_by: Vec<String>,
}

impl RestoreResult {
    /// Build a result from a shared unit output
    pub fn from_output(
        identity: RestoreUnitIdentity,
        requested_by: Vec<String>,
        output: &UnitOutput,
    ) -> Self {
        match output {
            Ok(outcome) => Self {
                identity,
                success: true,
                lock_file_path: Some(outcome.lock_file_path.clone()),
                error: None,
                requested_by,
            },
            Err(e) => Self {
                identity,
                success: false,
                lock_file_path: None,
                error: Some(e.to_string()),
                requested_by,
            },
        }
    }
}
