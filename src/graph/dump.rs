//! Diagnostic graph dumps
//!
//! Every nomination can leave a single-project graph description in the
//! project's output folder as `<uuid>.dg`. Dumps are best effort.

use super::assembly::assemble;
use crate::domain::ProjectRestoreSpec;
use crate::error::IoError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// File extension of diagnostic dumps
pub const DG_FILE_EXTENSION: &str = "dg";

/// Writes diagnostic graph descriptions
#[derive(Debug, Clone)]
pub struct GraphDumper {
    enabled: bool,
    directory: Option<PathBuf>,
}

impl GraphDumper {
    /// Dumper writing into each spec's output path
    pub fn new() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }

    /// Dumper that never writes
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            directory: None,
        }
    }

    /// Write every dump into `directory` instead of the output path
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Whether dumps are written at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Dump a single-project description. Failures are logged and swallowed.
    pub async fn dump(&self, spec: &Arc<ProjectRestoreSpec>) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }

        let Some(directory) = self
            .directory
            .as_deref()
            .or(spec.restore_metadata.output_path.as_deref())
        else {
            debug!(project = %spec.unique_name(), "no output path, skipping graph dump");
            return None;
        };

        match write_dump(directory, spec).await {
            Ok(path) => {
                debug!(project = %spec.unique_name(), path = %path.display(), "graph dump written");
                Some(path)
            }
            Err(e) => {
                warn!(project = %spec.unique_name(), error = %e, "failed to write graph dump");
                None
            }
        }
    }
}

impl Default for GraphDumper {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_dump(directory: &Path, spec: &Arc<ProjectRestoreSpec>) -> Result<PathBuf, IoError> {
    let path = directory.join(format!("{}.{}", Uuid::new_v4(), DG_FILE_EXTENSION));
    let graph = assemble([Arc::clone(spec)], &[]);
    let content = serde_json::to_vec_pretty(&graph).map_err(|e| IoError::Serialize {
        path: path.clone(),
        message: e.to_string(),
    })?;

    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| IoError::create_directory(directory, e))?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| IoError::write_file(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Framework, TargetFrameworkSpec};
    use crate::graph::DependencyGraphDescription;
    use tempfile::TempDir;

    fn spec(output: Option<PathBuf>) -> Arc<ProjectRestoreSpec> {
        let mut spec = ProjectRestoreSpec::new(vec![TargetFrameworkSpec::new(
            Framework::parse("net45").unwrap(),
        )]);
        spec.restore_metadata.project_unique_name = "A".to_string();
        spec.restore_metadata.project_path = "/src/A.csproj".to_string();
        spec.restore_metadata.output_path = output;
        Arc::new(spec)
    }

    #[tokio::test]
    async fn test_dump_writes_dg_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("obj");
        let path = GraphDumper::new().dump(&spec(Some(output.clone()))).await.unwrap();

        assert_eq!(path.parent().unwrap(), output);
        assert_eq!(path.extension().unwrap(), DG_FILE_EXTENSION);
        let graph: DependencyGraphDescription =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(graph.restore, vec!["A"]);
        assert_eq!(graph.projects.len(), 1);
    }

    #[tokio::test]
    async fn test_each_dump_gets_a_new_file() {
        let dir = TempDir::new().unwrap();
        let dumper = GraphDumper::new().with_directory(dir.path());
        let spec = spec(None);
        let first = dumper.dump(&spec).await.unwrap();
        let second = dumper.dump(&spec).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_dump_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = GraphDumper::new().dump(&spec(Some(blocker.join("obj")))).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_disabled_or_missing_output_path() {
        assert!(GraphDumper::disabled().dump(&spec(Some(PathBuf::from("/tmp")))).await.is_none());
        assert!(!GraphDumper::disabled().is_enabled());
        assert!(GraphDumper::new().dump(&spec(None)).await.is_none());
    }
}
