//! Tool restore helpers
//!
//! Ad-hoc tools are restored as standalone units into a shared tools folder
//! under the packages root, one lock file per (id, version, framework).

use crate::domain::{
    DependencyRecord, Framework, PackageVersion, ProjectRestoreSpec, RestoreMetadata,
    RestoreOutputType, TargetFrameworkSpec, VersionRange,
};
use std::path::{Path, PathBuf};

/// Framework used for tool references that do not name one
pub const DEFAULT_TOOL_FRAMEWORK: &str = "netcoreapp1.0";

/// Folder under the packages root holding tool restores
pub const TOOLS_FOLDER: &str = ".tools";

/// Lock file name written by the restore engine
pub const LOCK_FILE_NAME: &str = "project.assets.json";

/// Unique name of a tool spec. Equal (id, framework, range) triples share it.
pub fn tool_unique_name(id: &str, framework: &Framework, range: &VersionRange) -> String {
    format!(
        "{}-{}-{}",
        id,
        framework.short_folder_name(),
        range.to_normalized_string()
    )
    .to_lowercase()
}

/// Build the restore spec of a tool requested by `project_file_path`
pub fn tool_spec(
    project_file_path: &str,
    id: &str,
    range: VersionRange,
    framework: Framework,
) -> ProjectRestoreSpec {
    let unique_name = tool_unique_name(id, &framework, &range);

    let mut tfm = TargetFrameworkSpec::new(framework.clone());
    tfm.dependencies.push(DependencyRecord::package(id, range));

    let mut spec = ProjectRestoreSpec::new(vec![tfm]);
    spec.name = unique_name.clone();
    spec.restore_metadata = RestoreMetadata {
        project_unique_name: unique_name,
        project_name: id.to_string(),
        project_path: project_file_path.to_string(),
        output_path: None,
        output_type: RestoreOutputType::DotnetCliTool,
        original_target_frameworks: vec![framework.short_folder_name()],
    };
    spec
}

/// Resolves deterministic lock file locations for tool restores
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    packages_root: PathBuf,
}

impl ToolPathResolver {
    /// Create a resolver rooted at the global packages folder
    pub fn new(packages_root: impl Into<PathBuf>) -> Self {
        Self {
            packages_root: packages_root.into(),
        }
    }

    /// The packages root this resolver writes under
    pub fn packages_root(&self) -> &Path {
        &self.packages_root
    }

    /// `<root>/.tools/<id>` with a lower-cased id
    pub fn tool_directory(&self, id: &str) -> PathBuf {
        self.packages_root.join(TOOLS_FOLDER).join(id.to_lowercase())
    }

    /// `<root>/.tools/<id>/<version>/<framework>/project.assets.json`
    pub fn lock_file_path(&self, id: &str, version: &PackageVersion, framework: &Framework) -> PathBuf {
        self.tool_directory(id)
            .join(version.to_normalized_string())
            .join(framework.short_folder_name())
            .join(LOCK_FILE_NAME)
    }
}
