//! JSON output formatter for machine processing

use crate::graph::DependencyGraphDescription;
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use crate::restore::RestoreResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbose output includes the full graph
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    generated_at: DateTime<Utc>,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<&'a DependencyGraphDescription>,
    results: &'a [RestoreResult],
    errors: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    accepted: usize,
    superseded: usize,
    projects: usize,
    units: usize,
    failed_units: usize,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            generated_at: Utc::now(),
            summary: JsonSummary {
                accepted: result.accepted,
                superseded: result.superseded,
                projects: result.graph.projects.len(),
                units: result.results.len(),
                failed_units: result.failed_units(),
            },
            graph: (self.verbosity != Verbosity::Quiet).then_some(&result.graph),
            results: &result.results,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn format_graph(
        &self,
        graph: &DependencyGraphDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(graph).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Framework, ProjectRestoreSpec, TargetFrameworkSpec};
    use crate::graph::assemble;
    use crate::orchestrator::OrchestratorError;
    use crate::restore::{RestoreOutcome, RestoreUnitIdentity};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn sample_result() -> OrchestratorResult {
        let mut spec = ProjectRestoreSpec::new(vec![TargetFrameworkSpec::new(
            Framework::parse("net45").unwrap(),
        )]);
        spec.restore_metadata.project_unique_name = "/src/a.csproj".to_string();
        spec.restore_metadata.project_path = "/src/a.csproj".to_string();
        let spec = Arc::new(spec);
        let results = vec![RestoreResult::from_output(
            RestoreUnitIdentity::of(&spec),
            vec!["/src/a.csproj".to_string()],
            &Ok(RestoreOutcome::new(PathBuf::from("/src/obj/project.assets.json"))),
        )];

        OrchestratorResult {
            graph: assemble(vec![spec], &results),
            results,
            accepted: 1,
            superseded: 0,
            errors: vec![OrchestratorError::NominationError {
                project: "/src/b.csproj".to_string(),
                message: "no target frameworks for '/src/b.csproj'".to_string(),
            }],
        }
    }

    fn render(formatter: &JsonFormatter, result: &OrchestratorResult) -> serde_json::Value {
        let mut buf = Vec::new();
        formatter.format(result, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_json_output_shape() {
        let json = render(&JsonFormatter::new(Verbosity::Normal), &sample_result());

        assert!(json["generatedAt"].is_string());
        assert_eq!(json["summary"]["accepted"], 1);
        assert_eq!(json["summary"]["units"], 1);
        assert_eq!(json["summary"]["failedUnits"], 0);
        assert_eq!(json["results"][0]["success"], true);
        assert_eq!(json["graph"]["restore"][0], "/src/a.csproj");
        assert_eq!(
            json["errors"][0],
            "Failed to nominate /src/b.csproj: no target frameworks for '/src/b.csproj'"
        );
    }

    #[test]
    fn test_quiet_omits_graph() {
        let json = render(&JsonFormatter::new(Verbosity::Quiet), &sample_result());
        assert!(json.get("graph").is_none());
        assert!(json["results"].is_array());
    }

    #[test]
    fn test_format_graph() {
        let result = sample_result();
        let mut buf = Vec::new();
        JsonFormatter::new(Verbosity::Normal)
            .format_graph(&result.graph, &mut buf)
            .unwrap();
        let graph: DependencyGraphDescription = serde_json::from_slice(&buf).unwrap();
        assert_eq!(graph, result.graph);
    }
}
