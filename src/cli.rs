//! CLI argument parsing module for dgrestore

use crate::nomination::FrameworkPriority;
use clap::Parser;
use std::path::PathBuf;

/// Default nomination batch file
pub const DEFAULT_INPUT: &str = "nominations.json";

/// Parse a concurrency limit; zero is rejected
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", s))?;
    if value == 0 {
        return Err("concurrency must be greater than zero".to_string());
    }
    Ok(value)
}

/// Parse a framework order name
fn parse_framework_order(s: &str) -> Result<FrameworkPriority, String> {
    s.parse()
        .map_err(|other| format!("unknown framework order '{}' (expected declared or canonical)", other))
}

/// Restore-request aggregator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dgrestore",
    version,
    about = "Aggregate restore nominations into a deduplicated dependency graph"
)]
pub struct CliArgs {
    /// Nomination batch file (JSON)
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Configuration file (default: dgrestore.toml next to the input)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Restore options
    /// Write every diagnostic graph dump into this directory
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Global packages folder (tool lock files live under <DIR>/.tools)
    #[arg(long, value_name = "DIR")]
    pub packages_root: Option<PathBuf>,

    /// Do not write diagnostic graph dumps
    #[arg(long)]
    pub no_dump: bool,

    /// Maximum number of concurrent restore executions
    #[arg(long, value_name = "N", value_parser = parse_concurrency)]
    pub max_concurrency: Option<usize>,

    /// Framework preferred when a package is declared under several frameworks
    #[arg(long, value_name = "ORDER", value_parser = parse_framework_order)]
    pub framework_order: Option<FrameworkPriority>,
}

impl CliArgs {
    /// Whether progress spinners should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Default tracing filter directive for these arguments
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
