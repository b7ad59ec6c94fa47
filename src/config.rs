//! Configuration loading
//!
//! Settings come from three layers, highest precedence first:
//! - CLI arguments
//! - `dgrestore.toml` (next to the input file, or `--config`)
//! - built-in defaults

use crate::cache::DEFAULT_CONCURRENCY;
use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::nomination::FrameworkPriority;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up next to the input
pub const CONFIG_FILE_NAME: &str = "dgrestore.toml";

/// Packages folder used when nothing else is configured, relative to home
const DEFAULT_PACKAGES_DIR: &str = ".dgrestore/packages";

/// Contents of a `dgrestore.toml` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Global packages folder
    pub packages_root: Option<PathBuf>,
    /// Directory for every diagnostic dump
    pub scratch_dir: Option<PathBuf>,
    /// Whether diagnostic dumps are written
    pub dump_graphs: Option<bool>,
    /// Concurrent restore executions
    pub max_concurrency: Option<usize>,
    /// `declared` or `canonical`
    pub framework_order: Option<String>,
}

impl FileConfig {
    /// Parse config file contents
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        Self::parse(path, &content)
    }

    /// Load `dgrestore.toml` from `directory` when present
    pub fn discover(directory: &Path) -> Result<Option<Self>, ConfigError> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

/// Effective settings after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Global packages folder
    pub packages_root: PathBuf,
    /// Directory for every diagnostic dump; `None` writes next to each project
    pub scratch_dir: Option<PathBuf>,
    /// Whether diagnostic dumps are written
    pub dump_graphs: bool,
    /// Concurrent restore executions
    pub max_concurrency: usize,
    /// Cross-framework tie-break
    pub framework_priority: FrameworkPriority,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packages_root: default_packages_root(),
            scratch_dir: None,
            dump_graphs: true,
            max_concurrency: DEFAULT_CONCURRENCY,
            framework_priority: FrameworkPriority::default(),
        }
    }
}

impl Settings {
    /// Resolve settings for CLI arguments, reading the config file if any
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => {
                let directory = args
                    .input
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                FileConfig::discover(directory)?
            }
        };
        Self::layer(args, file.unwrap_or_default())
    }

    /// Apply CLI arguments over a config file over defaults
    pub fn layer(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_concurrency = args
            .max_concurrency
            .or(file.max_concurrency)
            .unwrap_or(defaults.max_concurrency);
        if max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency { value: 0 });
        }

        let framework_priority = match (args.framework_order, file.framework_order) {
            (Some(priority), _) => priority,
            (None, Some(name)) => name
                .parse()
                .map_err(|value| ConfigError::InvalidFrameworkOrder { value })?,
            (None, None) => defaults.framework_priority,
        };

        Ok(Self {
            packages_root: args
                .packages_root
                .clone()
                .or(file.packages_root)
                .unwrap_or(defaults.packages_root),
            scratch_dir: args.scratch_dir.clone().or(file.scratch_dir),
            dump_graphs: !args.no_dump && file.dump_graphs.unwrap_or(defaults.dump_graphs),
            max_concurrency,
            framework_priority,
        })
    }
}

fn default_packages_root() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_PACKAGES_DIR),
        None => PathBuf::from(DEFAULT_PACKAGES_DIR),
    }
}
