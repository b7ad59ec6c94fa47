//! Nomination handling
//!
//! This module provides:
//! - Reference normalization into dependency records
//! - Per-framework aggregation into a project restore spec
//! - Cross-framework deduplication of identity-level references
//! - The `NominationService` entry point

mod aggregator;
mod dedup;
mod normalizer;
mod restore_info;
mod service;

pub use aggregator::{to_framework_spec, to_package_spec, FrameworkPriority};
pub use dedup::{dedupe_package_references, dedupe_project_references};
pub use normalizer::{
    normalize, project_path, to_package_reference, to_project_reference, version_range,
};
pub use restore_info::{ProjectRestoreInfo, TargetFrameworkInfo};
pub use service::NominationService;
