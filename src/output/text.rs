//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Restore unit listing with results and requester counts
//! - Project and framework listing in verbose mode
//! - Nomination errors and a summary line

use crate::graph::{DependencyGraphDescription, RestoreUnitEntry};
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn pluralize(count: usize, singular: &str, plural: &str) -> String {
        format!("{} {}", count, if count == 1 { singular } else { plural })
    }

    /// Width of the widest unit label, for alignment
    fn label_width(units: &[RestoreUnitEntry]) -> usize {
        units
            .iter()
            .map(|u| u.identity.to_string().len())
            .max()
            .unwrap_or(0)
    }

    fn format_unit(
        &self,
        unit: &RestoreUnitEntry,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let label = format!("{:width$}", unit.identity.to_string(), width = width);
        let requesters = format!("({})", Self::pluralize(unit.requested_by.len(), "requester", "requesters"));

        let (marker, detail) = match &unit.result {
            Some(status) if status.success => (
                "ok",
                status
                    .lock_file_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            Some(status) => ("failed", status.error.clone().unwrap_or_default()),
            None => ("pending", String::new()),
        };

        if self.color {
            let marker = match marker {
                "ok" => "✓".green().to_string(),
                "failed" => "✗".red().bold().to_string(),
                _ => "·".dimmed().to_string(),
            };
            let detail = if unit.result.as_ref().is_some_and(|s| !s.success) {
                detail.red().to_string()
            } else {
                detail.dimmed().to_string()
            };
            writeln!(
                writer,
                "  {} {} {} {}",
                marker,
                label.bold(),
                requesters.dimmed(),
                detail
            )?;
        } else {
            writeln!(writer, "  [{}] {} {} {}", marker, label, requesters, detail)?;
        }

        if self.verbosity == Verbosity::Verbose && unit.requested_by.len() > 1 {
            for requester in &unit.requested_by {
                writeln!(writer, "      <- {}", requester)?;
            }
        }
        Ok(())
    }

    fn format_projects(
        &self,
        graph: &DependencyGraphDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let header = "Projects";
        if self.color {
            writeln!(writer, "{}", header.bold().underline())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        for project in &graph.projects {
            let frameworks: Vec<String> = project
                .frameworks
                .iter()
                .map(|f| f.framework.short_folder_name())
                .collect();
            let kind = if project.is_tool() { "tool" } else { "project" };
            writeln!(
                writer,
                "  {} [{}] {}",
                project.unique_name(),
                kind,
                frameworks.join(", ")
            )?;
            for tfm in &project.frameworks {
                for dependency in &tfm.dependencies {
                    writeln!(
                        writer,
                        "      {} {}",
                        tfm.framework.short_folder_name(),
                        dependency
                    )?;
                }
            }
        }
        writeln!(writer)
    }

    fn format_summary_line(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let failed = result.failed_units();
        let units = Self::pluralize(result.results.len(), "unit", "units");
        let nominated = Self::pluralize(result.accepted, "nomination", "nominations");

        let mut extras = Vec::new();
        if result.superseded > 0 {
            extras.push(format!("{} superseded", result.superseded));
        }
        if !result.errors.is_empty() {
            extras.push(Self::pluralize(result.errors.len(), "error", "errors"));
        }
        if failed > 0 {
            extras.push(format!("{} failed", failed));
        }
        let extras = if extras.is_empty() {
            String::new()
        } else {
            format!(" ({})", extras.join(", "))
        };

        if self.color {
            let line = format!("Restored {} from {}{}", units, nominated, extras);
            if result.has_failures() {
                writeln!(writer, "{}", line.yellow())
            } else {
                writeln!(writer, "{}", line.green())
            }
        } else {
            writeln!(writer, "Restored {} from {}{}", units, nominated, extras)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            self.format_graph(&result.graph, writer)?;

            if !result.errors.is_empty() {
                let header = "Errors";
                if self.color {
                    writeln!(writer, "{}", header.red().bold())?;
                } else {
                    writeln!(writer, "{}", header)?;
                }
                for error in &result.errors {
                    writeln!(writer, "  {}", error)?;
                }
                writeln!(writer)?;
            }
        }

        self.format_summary_line(result, writer)
    }

    fn format_graph(
        &self,
        graph: &DependencyGraphDescription,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Verbose {
            self.format_projects(graph, writer)?;
        }

        if graph.units.is_empty() {
            return writeln!(writer, "Nothing to restore\n");
        }

        let header = format!("Restore units ({})", graph.units.len());
        if self.color {
            writeln!(writer, "{}", header.bold().underline())?;
        } else {
            writeln!(writer, "{}", header)?;
        }
        let width = Self::label_width(&graph.units);
        for unit in &graph.units {
            self.format_unit(unit, width, writer)?;
        }
        writeln!(writer)
    }
}
