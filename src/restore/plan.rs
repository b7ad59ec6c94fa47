//! Lock path planning engine

use super::{RestoreEngine, RestoreOutcome, RestoreUnitIdentity, ToolPathResolver, LOCK_FILE_NAME};
use crate::domain::ProjectRestoreSpec;
use crate::error::RestoreError;
use async_trait::async_trait;

/// Engine that resolves where each unit's lock file would be written.
///
/// Tools land in the shared tools folder under the packages root; projects
/// land in their own output path. Nothing is read from or written to disk.
#[derive(Debug, Clone)]
pub struct PlanEngine {
    tools: ToolPathResolver,
}

impl PlanEngine {
    /// Create a planning engine with the given tool path resolver
    pub fn new(tools: ToolPathResolver) -> Self {
        Self { tools }
    }

    fn plan(&self, unit: &ProjectRestoreSpec) -> Result<RestoreOutcome, RestoreError> {
        let identity = RestoreUnitIdentity::of(unit);

        if unit.is_tool() {
            let tfm = unit
                .frameworks
                .first()
                .ok_or_else(|| RestoreError::failed(identity.to_string(), "tool has no framework"))?;
            let dependency = tfm.packages().next().ok_or_else(|| {
                RestoreError::failed(identity.to_string(), "tool has no package dependency")
            })?;
            let version = dependency
                .version_range
                .min_version()
                .ok_or_else(|| RestoreError::package_not_found(&dependency.name, "(, )"))?;
            return Ok(RestoreOutcome::new(self.tools.lock_file_path(
                &dependency.name,
                version,
                &tfm.framework,
            )));
        }

        let output = unit
            .restore_metadata
            .output_path
            .as_ref()
            .ok_or_else(|| RestoreError::failed(identity.to_string(), "project has no output path"))?;
        Ok(RestoreOutcome::new(output.join(LOCK_FILE_NAME)))
    }
}

#[async_trait]
impl RestoreEngine for PlanEngine {
    fn name(&self) -> &'static str {
        "plan"
    }

    async fn restore(&self, unit: &ProjectRestoreSpec) -> Result<RestoreOutcome, RestoreError> {
        self.plan(unit)
    }
}
