//! Nomination entry point

use super::aggregator::{to_package_spec, FrameworkPriority};
use super::restore_info::ProjectRestoreInfo;
use crate::cache::ProjectSystemCache;
use crate::error::NominationError;
use crate::graph::GraphDumper;
use crate::workspace::ProjectLookup;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Accepts nominations and stores their restore specs
pub struct NominationService {
    lookup: Arc<dyn ProjectLookup>,
    cache: Arc<dyn ProjectSystemCache>,
    dumper: GraphDumper,
    priority: FrameworkPriority,
    generation: AtomicU64,
}

impl NominationService {
    /// Create a service with default dumping and canonical framework priority
    pub fn new(lookup: Arc<dyn ProjectLookup>, cache: Arc<dyn ProjectSystemCache>) -> Self {
        Self {
            lookup,
            cache,
            dumper: GraphDumper::new(),
            priority: FrameworkPriority::default(),
            generation: AtomicU64::new(0),
        }
    }

    /// Set the diagnostic dumper (builder pattern)
    pub fn with_dumper(mut self, dumper: GraphDumper) -> Self {
        self.dumper = dumper;
        self
    }

    /// Set the cross-framework tie-break (builder pattern)
    pub fn with_priority(mut self, priority: FrameworkPriority) -> Self {
        self.priority = priority;
        self
    }

    /// The project cache nominations are written to
    pub fn cache(&self) -> &Arc<dyn ProjectSystemCache> {
        &self.cache
    }

    /// Reserve the next generation. Callers that dispatch nominations
    /// concurrently reserve in arrival order and pass it to `nominate_at`.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Nominate a project for restore.
    ///
    /// Validation happens before any state changes. Returns `Ok(true)` once
    /// the restore spec is stored or when the project is not part of the workspace,
    /// and `Ok(false)` when a newer nomination of the same project already
    /// stored its spec.
    pub async fn nominate(
        &self,
        project_unique_name: &str,
        restore_info: Option<&ProjectRestoreInfo>,
    ) -> Result<bool, NominationError> {
        let info = validate(project_unique_name, restore_info)?;
        let generation = self.next_generation();
        self.store(project_unique_name, info, generation).await
    }

    /// Nominate with a generation reserved through `next_generation`
    pub async fn nominate_at(
        &self,
        project_unique_name: &str,
        restore_info: Option<&ProjectRestoreInfo>,
        generation: u64,
    ) -> Result<bool, NominationError> {
        let info = validate(project_unique_name, restore_info)?;
        self.store(project_unique_name, info, generation).await
    }

    async fn store(
        &self,
        project_unique_name: &str,
        info: &ProjectRestoreInfo,
        generation: u64,
    ) -> Result<bool, NominationError> {
        info!(project = project_unique_name, generation, "nominate");

        let mut spec = to_package_spec(project_unique_name, info, self.priority)?;
        spec.file_path = project_unique_name.to_string();
        spec.restore_metadata.project_path = project_unique_name.to_string();

        let Some(names) = self.lookup.lookup(project_unique_name) else {
            debug!(project = project_unique_name, "project not in workspace, ignoring");
            return Ok(true);
        };

        spec.name = names.short_name.clone();
        spec.restore_metadata.project_name = names.short_name.clone();
        spec.restore_metadata.project_unique_name = names.unique_name.clone();
        spec.restore_metadata.output_path = Some(names.output_path(&info.base_intermediate_path));

        let spec = Arc::new(spec);
        self.dumper.dump(&spec).await;

        Ok(self.cache.add_project_restore_info(&names, spec, generation))
    }
}

fn validate<'a>(
    project_unique_name: &str,
    restore_info: Option<&'a ProjectRestoreInfo>,
) -> Result<&'a ProjectRestoreInfo, NominationError> {
    if project_unique_name.is_empty() {
        return Err(NominationError::EmptyProjectName);
    }
    let info =
        restore_info.ok_or_else(|| NominationError::missing_restore_info(project_unique_name))?;
    if info.target_frameworks.is_none() {
        return Err(NominationError::missing_target_frameworks(project_unique_name));
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryProjectCache;
    use crate::domain::ReferenceItem;
    use crate::nomination::TargetFrameworkInfo;
    use crate::workspace::{ProjectNames, StaticProjectLookup};
    use std::path::PathBuf;

    const PROJECT: &str = "/src/x/x.csproj";

    fn service() -> (NominationService, Arc<InMemoryProjectCache>) {
        let lookup = StaticProjectLookup::new().with_project(ProjectNames::from_path(PROJECT));
        let cache = Arc::new(InMemoryProjectCache::new());
        let service = NominationService::new(Arc::new(lookup), cache.clone())
            .with_dumper(GraphDumper::disabled());
        (service, cache)
    }

    fn info() -> ProjectRestoreInfo {
        ProjectRestoreInfo::new(vec![
            TargetFrameworkInfo::new("netcoreapp1.0").with_package(ReferenceItem::new("a"))
        ])
    }

    #[tokio::test]
    async fn test_nominate_stores_spec() {
        let (service, cache) = service();
        assert!(service.nominate(PROJECT, Some(&info())).await.unwrap());

        let spec = cache.get_project_restore_info(PROJECT).unwrap();
        assert_eq!(spec.name, "x");
        assert_eq!(spec.file_path, PROJECT);
        assert_eq!(spec.restore_metadata.project_path, PROJECT);
        assert_eq!(spec.restore_metadata.project_unique_name, PROJECT);
        assert_eq!(
            spec.restore_metadata.output_path,
            Some(PathBuf::from("/src/x/obj"))
        );
        assert!(spec.frameworks[0].dependencies[0].version_range.is_all());
    }

    #[tokio::test]
    async fn test_unknown_project_is_a_no_op() {
        let (service, cache) = service();
        assert!(service.nominate("/other.csproj", Some(&info())).await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_argument_errors() {
        let (service, cache) = service();
        let err = service.nominate("", Some(&info())).await.unwrap_err();
        assert!(err.is_argument_error());

        let err = service.nominate(PROJECT, None).await.unwrap_err();
        assert!(err.is_argument_error());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_frameworks_is_invalid_state() {
        let (service, cache) = service();
        let err = service
            .nominate(PROJECT, Some(&ProjectRestoreInfo::default()))
            .await
            .unwrap_err();
        assert!(err.is_invalid_state());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_bad_moniker_leaves_cache_untouched() {
        let (service, cache) = service();
        let bad = ProjectRestoreInfo::new(vec![TargetFrameworkInfo::new("bogus")]);
        let err = service.nominate(PROJECT, Some(&bad)).await.unwrap_err();
        assert!(matches!(err, NominationError::InvalidFramework { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_renomination_replaces_spec() {
        let (service, cache) = service();
        service.nominate(PROJECT, Some(&info())).await.unwrap();
        let second = ProjectRestoreInfo::new(vec![TargetFrameworkInfo::new("net45")]);
        assert!(service.nominate(PROJECT, Some(&second)).await.unwrap());

        let spec = cache.get_project_restore_info(PROJECT).unwrap();
        assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["net45"]);
        assert_eq!(cache.generation(PROJECT), Some(2));
    }

    #[tokio::test]
    async fn test_reserved_generation_orders_nominations() {
        let (service, cache) = service();
        let older = service.next_generation();
        let newer = service.next_generation();
        let second = ProjectRestoreInfo::new(vec![TargetFrameworkInfo::new("net45")]);

        // The newer nomination lands first; the older one must not replace it
        assert!(service.nominate_at(PROJECT, Some(&second), newer).await.unwrap());
        assert!(!service.nominate_at(PROJECT, Some(&info()), older).await.unwrap());

        let spec = cache.get_project_restore_info(PROJECT).unwrap();
        assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["net45"]);
        assert_eq!(cache.generation(PROJECT), Some(newer));
    }
}
