//! dgrestore - Restore-request aggregation CLI tool
//!
//! Reads a batch of nominations, assembles the deduplicated dependency
//! graph and restores each unique unit once.

use clap::Parser;
use dgrestore::cli::CliArgs;
use dgrestore::config::Settings;
use dgrestore::orchestrator::Orchestrator;
use dgrestore::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level implied by `--verbose`
fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("dgrestore v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Input: {}", args.input.display());
    }

    let settings = Settings::resolve(&args)?;
    tracing::debug!(?settings, "resolved settings");

    let orchestrator = Orchestrator::new(settings);
    let result = orchestrator.run(&args.input, args.show_progress()).await?;

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_failures() {
        // Partial success - some nominations or units failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
