//! Core domain models for dgrestore
//!
//! This module contains the fundamental types used throughout the crate:
//! - Target framework identifiers and framework orderings
//! - Package versions and version ranges
//! - Raw reference items with their property bags
//! - Normalized dependency records and identity-level references
//! - Project restore specifications

mod dependency;
mod framework;
mod reference;
mod restore_spec;
mod version_range;

pub use dependency::{
    DependencyKind, DependencyRecord, PackageIdentity, PackageReference, ProjectReference,
};
pub use framework::{DeclaredOrder, Framework, FrameworkFamily, FrameworkOrdering, FrameworkSorter};
pub use reference::{
    ReferenceItem, ReferenceProperties, PROJECT_PATH_PROPERTY, TARGET_FRAMEWORK_PROPERTY,
    VERSION_PROPERTY,
};
pub use restore_spec::{ProjectRestoreSpec, RestoreMetadata, RestoreOutputType, TargetFrameworkSpec};
pub use version_range::{PackageVersion, VersionRange};
