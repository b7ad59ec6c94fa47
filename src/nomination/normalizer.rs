//! Reference normalization
//!
//! Converts raw reference items into owned dependency records. Missing or
//! malformed optional input never fails: package ranges default to `all`
//! and project paths default to `None`.

use crate::domain::{
    DependencyKind, DependencyRecord, Framework, PackageIdentity, PackageReference,
    ProjectReference, ReferenceItem, VersionRange, PROJECT_PATH_PROPERTY, VERSION_PROPERTY,
};
use tracing::debug;

/// Normalize a reference item into a dependency record of the given kind
pub fn normalize(item: &ReferenceItem, kind: DependencyKind) -> DependencyRecord {
    match kind {
        DependencyKind::Package => DependencyRecord::package(&item.name, version_range(item)),
        DependencyKind::ExternalProject => {
            DependencyRecord::project(&item.name, project_path(item))
        }
    }
}

/// Read the `Version` property as a range, defaulting to `all`
pub fn version_range(item: &ReferenceItem) -> VersionRange {
    let Some(raw) = item.property(VERSION_PROPERTY).filter(|v| !v.trim().is_empty()) else {
        return VersionRange::all();
    };

    match VersionRange::parse(raw) {
        Ok(range) => range,
        Err(e) => {
            debug!(
                package = %item.name,
                version = raw,
                error = %e,
                "unparsable version range, accepting any version"
            );
            VersionRange::all()
        }
    }
}

/// Read the `ProjectFileFullPath` property
pub fn project_path(item: &ReferenceItem) -> Option<String> {
    item.property(PROJECT_PATH_PROPERTY)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Build a framework-pinned package reference keyed by the range's minimum
pub fn to_package_reference(item: &ReferenceItem, framework: &Framework) -> PackageReference {
    let range = version_range(item);
    let identity = PackageIdentity::new(&item.name, range.min_version().cloned());
    PackageReference::new(identity, framework.clone())
}

/// Build an identity-level project reference
pub fn to_project_reference(item: &ReferenceItem) -> ProjectReference {
    ProjectReference::new(&item.name, project_path(item))
}
