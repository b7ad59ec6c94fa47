//! Target-framework aggregation
//!
//! Folds one nomination's per-framework references into a
//! `ProjectRestoreSpec`: one `TargetFrameworkSpec` per declared framework,
//! identity-level package and project references, and tool specs.

use super::dedup::{dedupe_package_references, dedupe_project_references};
use super::normalizer::{normalize, to_package_reference, to_project_reference, version_range};
use super::restore_info::{ProjectRestoreInfo, TargetFrameworkInfo};
use crate::domain::{
    DeclaredOrder, DependencyKind, Framework, FrameworkOrdering, FrameworkSorter,
    ProjectRestoreSpec, RestoreMetadata, RestoreOutputType, TargetFrameworkSpec,
    TARGET_FRAMEWORK_PROPERTY,
};
use crate::error::NominationError;
use crate::restore::{tool_spec, DEFAULT_TOOL_FRAMEWORK};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which framework wins when a package is declared under several frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkPriority {
    /// Canonical framework sort order
    #[default]
    Canonical,
    /// The order frameworks were declared in the nomination
    Declared,
}

impl FrameworkPriority {
    fn ordering(&self, declared: &[Framework]) -> Box<dyn FrameworkOrdering> {
        match self {
            FrameworkPriority::Canonical => Box::new(FrameworkSorter),
            FrameworkPriority::Declared => Box::new(DeclaredOrder::new(declared.to_vec())),
        }
    }
}

impl FromStr for FrameworkPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(FrameworkPriority::Canonical),
            "declared" => Ok(FrameworkPriority::Declared),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for FrameworkPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkPriority::Canonical => write!(f, "canonical"),
            FrameworkPriority::Declared => write!(f, "declared"),
        }
    }
}

/// Build the framework spec for one declared framework: packages first,
/// then projects, each in declaration order
pub fn to_framework_spec(info: &TargetFrameworkInfo, framework: Framework) -> TargetFrameworkSpec {
    let mut spec = TargetFrameworkSpec::new(framework);
    spec.dependencies.extend(
        info.package_references
            .iter()
            .map(|item| normalize(item, DependencyKind::Package)),
    );
    spec.dependencies.extend(
        info.project_references
            .iter()
            .map(|item| normalize(item, DependencyKind::ExternalProject)),
    );
    spec
}

/// Parse every declared moniker; any failure fails the whole nomination
fn parse_frameworks(
    project: &str,
    infos: &[TargetFrameworkInfo],
) -> Result<Vec<Framework>, NominationError> {
    let mut frameworks: Vec<Framework> = Vec::with_capacity(infos.len());
    for info in infos {
        let framework = Framework::parse(&info.target_framework_moniker)
            .map_err(|e| NominationError::invalid_framework(project, e))?;
        if frameworks.contains(&framework) {
            return Err(NominationError::duplicate_framework(
                project,
                framework.short_folder_name(),
            ));
        }
        frameworks.push(framework);
    }
    Ok(frameworks)
}

/// Aggregate a nomination into a project restore spec.
/// `project` is used for error context and as the tools' calling project.
pub fn to_package_spec(
    project: &str,
    info: &ProjectRestoreInfo,
    priority: FrameworkPriority,
) -> Result<ProjectRestoreSpec, NominationError> {
    let infos = info
        .target_frameworks
        .as_ref()
        .ok_or_else(|| NominationError::missing_target_frameworks(project))?;

    let frameworks = parse_frameworks(project, infos)?;

    let framework_specs: Vec<TargetFrameworkSpec> = infos
        .iter()
        .zip(&frameworks)
        .map(|(tfi, framework)| to_framework_spec(tfi, framework.clone()))
        .collect();

    let package_references = infos
        .iter()
        .zip(&frameworks)
        .flat_map(|(tfi, framework)| {
            tfi.package_references
                .iter()
                .map(move |item| to_package_reference(item, framework))
        })
        .collect();
    let ordering = priority.ordering(&frameworks);
    let package_references = dedupe_package_references(package_references, ordering.as_ref());

    let project_references = dedupe_project_references(
        infos
            .iter()
            .flat_map(|tfi| tfi.project_references.iter().map(to_project_reference))
            .collect(),
    );

    let mut tool_references = Vec::with_capacity(info.tool_references.len());
    for item in &info.tool_references {
        let moniker = item
            .property(TARGET_FRAMEWORK_PROPERTY)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_TOOL_FRAMEWORK);
        let framework = Framework::parse(moniker)
            .map_err(|e| NominationError::invalid_framework(project, e))?;
        tool_references.push(tool_spec(project, &item.name, version_range(item), framework));
    }

    let mut spec = ProjectRestoreSpec::new(framework_specs);
    spec.restore_metadata = RestoreMetadata {
        output_type: RestoreOutputType::NetCore,
        original_target_frameworks: frameworks.iter().map(|f| f.short_folder_name()).collect(),
        ..RestoreMetadata::default()
    };
    spec.package_references = package_references;
    spec.project_references = project_references;
    spec.tool_references = tool_references;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageVersion, ReferenceItem};
    use crate::error::FrameworkError;

    fn info(frameworks: Vec<TargetFrameworkInfo>) -> ProjectRestoreInfo {
        ProjectRestoreInfo::new(frameworks)
    }

    #[test]
    fn test_single_framework_package_without_version() {
        let spec = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("netcoreapp1.0").with_package(ReferenceItem::new("a"))
            ]),
            FrameworkPriority::Canonical,
        )
        .unwrap();

        assert_eq!(spec.frameworks.len(), 1);
        let deps = &spec.frameworks[0].dependencies;
        assert_eq!(deps.len(), 1);
        assert!(deps[0].version_range.is_all());
        assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["netcoreapp1.0"]);
        assert_eq!(spec.restore_metadata.output_type, RestoreOutputType::NetCore);
    }

    #[test]
    fn test_packages_precede_projects() {
        let tfi = TargetFrameworkInfo::new("net45")
            .with_project(ReferenceItem::project("p1", "/src/p1.csproj"))
            .with_package(ReferenceItem::package("a", "1.0.0"))
            .with_package(ReferenceItem::package("b", "2.0.0"));
        let spec = to_framework_spec(&tfi, Framework::parse("net45").unwrap());
        let names: Vec<&str> = spec.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "p1"]);
        assert_eq!(spec.dependencies[2].kind, DependencyKind::ExternalProject);
    }

    #[test]
    fn test_cross_framework_identity_view() {
        let spec = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("net45").with_package(ReferenceItem::package("a", "1.0.0")),
                TargetFrameworkInfo::new("net472")
                    .with_package(ReferenceItem::package("a", "2.0.0")),
            ]),
            FrameworkPriority::Declared,
        )
        .unwrap();

        assert_eq!(spec.package_references.len(), 1);
        assert_eq!(
            spec.package_references[0].identity.version,
            Some(PackageVersion::new(1, 0, 0))
        );
        // Framework-specific views keep every entry
        assert_eq!(spec.frameworks[0].dependencies.len(), 1);
        assert_eq!(spec.frameworks[1].dependencies.len(), 1);
    }

    #[test]
    fn test_declared_priority_follows_declaration() {
        let spec = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("net472")
                    .with_package(ReferenceItem::package("a", "2.0.0")),
                TargetFrameworkInfo::new("net45").with_package(ReferenceItem::package("a", "1.0.0")),
            ]),
            FrameworkPriority::Declared,
        )
        .unwrap();
        assert_eq!(
            spec.package_references[0].identity.version,
            Some(PackageVersion::new(2, 0, 0))
        );
    }

    #[test]
    fn test_project_references_deduplicated() {
        let spec = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("net45")
                    .with_project(ReferenceItem::project("a", "C:\\Foo\\a.csproj")),
                TargetFrameworkInfo::new("net472")
                    .with_project(ReferenceItem::project("a", "c:\\foo\\A.CSPROJ")),
            ]),
            FrameworkPriority::Canonical,
        )
        .unwrap();
        assert_eq!(spec.project_references.len(), 1);
    }

    #[test]
    fn test_missing_frameworks_is_invalid_state() {
        let err = to_package_spec("X", &ProjectRestoreInfo::default(), FrameworkPriority::Canonical)
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn test_invalid_moniker_fails_nomination() {
        let err = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("net45"),
                TargetFrameworkInfo::new("bogus"),
            ]),
            FrameworkPriority::Canonical,
        )
        .unwrap_err();
        assert_eq!(
            err,
            NominationError::invalid_framework("X", FrameworkError::unrecognized("bogus"))
        );
    }

    #[test]
    fn test_duplicate_framework_fails_nomination() {
        let err = to_package_spec(
            "X",
            &info(vec![
                TargetFrameworkInfo::new("net45"),
                TargetFrameworkInfo::new(".NETFramework,Version=v4.5"),
            ]),
            FrameworkPriority::Canonical,
        )
        .unwrap_err();
        assert!(matches!(err, NominationError::DuplicateFramework { .. }));
    }

    #[test]
    fn test_tool_references_become_tool_specs() {
        let spec = to_package_spec(
            "/src/x/x.csproj",
            &info(vec![TargetFrameworkInfo::new("net45")])
                .with_tool(ReferenceItem::package("dotnet-ef", "1.0.0"))
                .with_tool(
                    ReferenceItem::package("dotnet-watch", "2.0.0")
                        .with_property(TARGET_FRAMEWORK_PROPERTY, "netcoreapp2.0"),
                ),
            FrameworkPriority::Canonical,
        )
        .unwrap();

        assert_eq!(spec.tool_references.len(), 2);
        let first = &spec.tool_references[0];
        assert!(first.is_tool());
        assert_eq!(first.restore_metadata.project_path, "/src/x/x.csproj");
        assert_eq!(first.frameworks[0].framework.short_folder_name(), "netcoreapp1.0");
        assert_eq!(
            spec.tool_references[1].frameworks[0].framework.short_folder_name(),
            "netcoreapp2.0"
        );
    }

    #[test]
    fn test_framework_priority_from_str() {
        assert_eq!(
            "declared".parse::<FrameworkPriority>(),
            Ok(FrameworkPriority::Declared)
        );
        assert_eq!(
            "Canonical".parse::<FrameworkPriority>(),
            Ok(FrameworkPriority::Canonical)
        );
        assert!("random".parse::<FrameworkPriority>().is_err());
        assert_eq!(FrameworkPriority::Declared.to_string(), "declared");
    }
}
