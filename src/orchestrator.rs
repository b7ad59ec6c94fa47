//! Batch orchestrator for the whole restore workflow
//!
//! This module provides:
//! - Workflow coordination: load → nominate → assemble → restore → report
//! - Concurrent nominations with partial continuation on errors
//! - A pluggable restore engine (lock path planning by default)

use crate::cache::{InMemoryProjectCache, ProjectSystemCache};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::graph::{assemble, DependencyGraphDescription, GraphDumper};
use crate::nomination::{NominationService, ProjectRestoreInfo};
use crate::progress::Progress;
use crate::restore::{PlanEngine, RestoreEngine, RestoreResult, RestoreRunner, ToolPathResolver};
use crate::workspace::{ProjectNames, StaticProjectLookup};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One nomination in a batch file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationRequest {
    /// Project being nominated
    pub project_unique_name: String,
    /// Its restore info; absent is an argument error
    #[serde(default)]
    pub restore_info: Option<ProjectRestoreInfo>,
}

/// A batch of workspace projects and nominations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationBatch {
    /// Projects loaded in the workspace
    #[serde(default)]
    pub projects: Vec<ProjectNames>,
    /// Nominations, in arrival order
    #[serde(default)]
    pub nominations: Vec<NominationRequest>,
}

impl NominationBatch {
    /// Read a batch file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }
}

/// Orchestrator for coordinating the restore workflow
pub struct Orchestrator {
    settings: Settings,
    engine: Arc<dyn RestoreEngine>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Final graph with unit results attached
    pub graph: DependencyGraphDescription,
    /// One result per unique restore unit
    pub results: Vec<RestoreResult>,
    /// Nominations stored in the project cache
    pub accepted: usize,
    /// Nominations discarded because a newer one won
    pub superseded: usize,
    /// Errors encountered during processing
    pub errors: Vec<OrchestratorError>,
}

impl OrchestratorResult {
    /// Number of restore units that failed
    pub fn failed_units(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    /// True when any nomination or unit failed
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty() || self.failed_units() > 0
    }
}

/// Errors that can occur during orchestration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A nomination was rejected
    NominationError { project: String, message: String },
    /// A nomination task did not complete
    TaskError(String),
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::NominationError { project, message } => {
                write!(f, "Failed to nominate {}: {}", project, message)
            }
            OrchestratorError::TaskError(msg) => write!(f, "Nomination task failed: {}", msg),
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl Orchestrator {
    /// Create an orchestrator that plans lock paths under the packages root
    pub fn new(settings: Settings) -> Self {
        let engine = PlanEngine::new(ToolPathResolver::new(settings.packages_root.clone()));
        Self::with_engine(settings, Arc::new(engine))
    }

    /// Create an orchestrator with a custom restore engine
    pub fn with_engine(settings: Settings, engine: Arc<dyn RestoreEngine>) -> Self {
        Self { settings, engine }
    }

    fn dumper(&self) -> GraphDumper {
        if !self.settings.dump_graphs {
            return GraphDumper::disabled();
        }
        match &self.settings.scratch_dir {
            Some(dir) => GraphDumper::new().with_directory(dir),
            None => GraphDumper::new(),
        }
    }

    /// Run the workflow for a batch file
    pub async fn run(&self, input: &Path, show_progress: bool) -> Result<OrchestratorResult, ConfigError> {
        let batch = NominationBatch::load(input)?;
        Ok(self.run_batch(batch, show_progress).await)
    }

    /// Run the workflow for an in-memory batch
    pub async fn run_batch(&self, batch: NominationBatch, show_progress: bool) -> OrchestratorResult {
        let mut progress = Progress::new(show_progress);
        let mut errors = Vec::new();
        let mut accepted = 0;
        let mut superseded = 0;

        let lookup: StaticProjectLookup = batch.projects.into_iter().collect();
        let cache = Arc::new(InMemoryProjectCache::new());
        let service = Arc::new(
            NominationService::new(Arc::new(lookup), cache.clone())
                .with_dumper(self.dumper())
                .with_priority(self.settings.framework_priority),
        );

        // Step 1: Nominate every project concurrently; generations are
        // reserved in arrival order so the last nomination of a project wins
        progress.start(batch.nominations.len() as u64, "Nominating projects");
        let mut tasks = JoinSet::new();
        for request in batch.nominations {
            let service = Arc::clone(&service);
            let generation = service.next_generation();
            tasks.spawn(async move {
                let outcome = service
                    .nominate_at(
                        &request.project_unique_name,
                        request.restore_info.as_ref(),
                        generation,
                    )
                    .await;
                (request.project_unique_name, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            progress.inc();
            match joined {
                Ok((project, Ok(true))) => {
                    progress.set_message(&project);
                    accepted += 1;
                }
                Ok((_, Ok(false))) => superseded += 1,
                Ok((project, Err(e))) => errors.push(OrchestratorError::NominationError {
                    project,
                    message: e.to_string(),
                }),
                Err(e) => errors.push(OrchestratorError::TaskError(e.to_string())),
            }
        }
        progress.finish_and_clear();

        // Step 2: Assemble the graph from the cached snapshots
        let specs = cache.snapshot();
        let graph = assemble(specs.iter().cloned(), &[]);

        // Step 3: Restore each unique unit once
        progress.spinner("Restoring units...");
        let runner = RestoreRunner::new(Arc::clone(&self.engine), self.settings.max_concurrency);
        let results = runner.run(&graph).await;
        progress.finish_and_clear();

        OrchestratorResult {
            graph: assemble(specs, &results),
            results,
            accepted,
            superseded,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceItem;
    use crate::nomination::TargetFrameworkInfo;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            packages_root: PathBuf::from("/packages"),
            dump_graphs: false,
            ..Settings::default()
        }
    }

    fn request(project: &str, info: Option<ProjectRestoreInfo>) -> NominationRequest {
        NominationRequest {
            project_unique_name: project.to_string(),
            restore_info: info,
        }
    }

    fn info() -> ProjectRestoreInfo {
        ProjectRestoreInfo::new(vec![
            TargetFrameworkInfo::new("netcoreapp1.0").with_package(ReferenceItem::package("a", "1.0.0"))
        ])
    }

    #[tokio::test]
    async fn test_run_batch() {
        let batch = NominationBatch {
            projects: vec![
                ProjectNames::from_path("/src/a/a.csproj"),
                ProjectNames::from_path("/src/b/b.csproj"),
            ],
            nominations: vec![
                request("/src/a/a.csproj", Some(info())),
                request("/src/b/b.csproj", Some(info())),
            ],
        };
        let result = Orchestrator::new(settings()).run_batch(batch, false).await;

        assert_eq!(result.accepted, 2);
        assert!(result.errors.is_empty());
        assert_eq!(result.results.len(), 2);
        assert!(!result.has_failures());
        assert_eq!(
            result.results[0].lock_file_path,
            Some(PathBuf::from("/src/a/obj/project.assets.json"))
        );
        assert!(result.graph.units.iter().all(|u| u.result.is_some()));
    }

    #[tokio::test]
    async fn test_partial_failure_continues() {
        let batch = NominationBatch {
            projects: vec![ProjectNames::from_path("/src/a/a.csproj")],
            nominations: vec![
                request("/src/a/a.csproj", Some(info())),
                request("/src/b/b.csproj", None),
            ],
        };
        let result = Orchestrator::new(settings()).run_batch(batch, false).await;

        assert_eq!(result.accepted, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].to_string().starts_with("Failed to nominate /src/b/b.csproj"));
        assert!(result.has_failures());
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_batch_deserialize() {
        let json = r#"{
            "projects": [{"fullName": "/a/a.csproj", "uniqueName": "/a/a.csproj", "shortName": "a"}],
            "nominations": [{"projectUniqueName": "/a/a.csproj", "restoreInfo": {"targetFrameworks": []}}]
        }"#;
        let batch: NominationBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.projects.len(), 1);
        assert_eq!(batch.nominations[0].project_unique_name, "/a/a.csproj");
        assert!(batch.nominations[0].restore_info.is_some());
    }

    #[test]
    fn test_batch_load_errors() {
        let err = NominationBatch::load(Path::new("/nonexistent/batch.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = NominationBatch::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::NominationError {
            project: "x".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to nominate x: boom");
        assert_eq!(
            OrchestratorError::TaskError("panicked".to_string()).to_string(),
            "Nomination task failed: panicked"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_nomination_last_in_batch_wins() {
        for _ in 0..20 {
            let batch = NominationBatch {
                projects: vec![ProjectNames::from_path("/src/x/x.csproj")],
                nominations: vec![
                    request(
                        "/src/x/x.csproj",
                        Some(ProjectRestoreInfo::new(vec![TargetFrameworkInfo::new("net45")])),
                    ),
                    request(
                        "/src/x/x.csproj",
                        Some(ProjectRestoreInfo::new(vec![TargetFrameworkInfo::new("net472")])),
                    ),
                ],
            };
            let result = Orchestrator::new(settings()).run_batch(batch, false).await;

            let spec = result.graph.project("/src/x/x.csproj").unwrap();
            assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["net472"]);
            assert_eq!(result.accepted + result.superseded, 2);
        }
    }
}
