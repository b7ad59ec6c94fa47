//! Application error types using thiserror
//!
//! Error hierarchy:
//! - NominationError: Caller contract violations and malformed required input
//! - FrameworkError / VersionRangeError: Parse failures for monikers and ranges
//! - RestoreError: Per-restore-unit execution failures
//! - ConfigError: Issues with CLI configuration or input files
//! - IoError: Diagnostic artifact file system failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Nomination related errors
    #[error(transparent)]
    Nomination(#[from] NominationError),

    /// Restore unit related errors
    #[error(transparent)]
    Restore(#[from] RestoreError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors raised synchronously by a nomination, before any state is mutated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NominationError {
    /// The project unique name was empty
    #[error("argument cannot be null or empty: project unique name")]
    EmptyProjectName,

    /// No restore info was supplied
    #[error("argument cannot be null: restore info for '{project}'")]
    MissingRestoreInfo { project: String },

    /// The restore info carried no target framework list
    #[error("no target frameworks for '{project}'")]
    MissingTargetFrameworks { project: String },

    /// A target framework moniker could not be parsed
    #[error("invalid target framework in '{project}': {source}")]
    InvalidFramework {
        project: String,
        #[source]
        source: FrameworkError,
    },

    /// The same framework was declared twice in one nomination
    #[error("target framework '{framework}' declared more than once in '{project}'")]
    DuplicateFramework { project: String, framework: String },
}

/// Errors parsing a target framework moniker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameworkError {
    /// Empty moniker
    #[error("target framework moniker is empty")]
    Empty,

    /// Unknown framework family or shape
    #[error("unrecognized target framework moniker '{moniker}'")]
    Unrecognized { moniker: String },

    /// Family recognized but version part is malformed
    #[error("invalid version in target framework moniker '{moniker}'")]
    InvalidVersion { moniker: String },
}

/// Errors parsing a version or version range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionRangeError {
    /// Empty input
    #[error("version range is empty")]
    Empty,

    /// Malformed version component
    #[error("invalid version '{value}'")]
    InvalidVersion { value: String },

    /// Malformed interval notation
    #[error("invalid version range '{value}': {message}")]
    InvalidRange { value: String, message: String },
}

/// Errors produced while executing a single restore unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    /// The engine failed to restore the unit
    #[error("restore failed for {unit}: {message}")]
    Failed { unit: String, message: String },

    /// A requested package could not be found by the engine
    #[error("unable to find package '{package}' with version {version}")]
    PackageNotFound { package: String, version: String },

    /// No unit with this identity was submitted
    #[error("no restore unit registered for {unit}")]
    UnknownUnit { unit: String },
}

/// Errors related to configuration and input files
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration or input file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration or input file
    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Invalid concurrency setting
    #[error("invalid concurrency '{value}': expected a number greater than zero")]
    InvalidConcurrency { value: usize },

    /// Invalid framework order setting
    #[error("invalid framework order '{value}': expected 'declared' or 'canonical'")]
    InvalidFrameworkOrder { value: String },
}

/// Errors related to IO operations on diagnostic artifacts
#[derive(Error, Debug)]
pub enum IoError {
    /// Failed to create a directory
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize an artifact
    #[error("failed to serialize {path}: {message}")]
    Serialize { path: PathBuf, message: String },
}

impl NominationError {
    /// Creates a new MissingRestoreInfo error
    pub fn missing_restore_info(project: impl Into<String>) -> Self {
        NominationError::MissingRestoreInfo {
            project: project.into(),
        }
    }

    /// Creates a new MissingTargetFrameworks error
    pub fn missing_target_frameworks(project: impl Into<String>) -> Self {
        NominationError::MissingTargetFrameworks {
            project: project.into(),
        }
    }

    /// Creates a new InvalidFramework error
    pub fn invalid_framework(project: impl Into<String>, source: FrameworkError) -> Self {
        NominationError::InvalidFramework {
            project: project.into(),
            source,
        }
    }

    /// Creates a new DuplicateFramework error
    pub fn duplicate_framework(project: impl Into<String>, framework: impl Into<String>) -> Self {
        NominationError::DuplicateFramework {
            project: project.into(),
            framework: framework.into(),
        }
    }

    /// Returns true for caller contract violations on the arguments themselves
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            NominationError::EmptyProjectName | NominationError::MissingRestoreInfo { .. }
        )
    }

    /// Returns true when the arguments were present but in an unusable state
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, NominationError::MissingTargetFrameworks { .. })
    }
}

impl FrameworkError {
    /// Creates a new Unrecognized error
    pub fn unrecognized(moniker: impl Into<String>) -> Self {
        FrameworkError::Unrecognized {
            moniker: moniker.into(),
        }
    }

    /// Creates a new InvalidVersion error
    pub fn invalid_version(moniker: impl Into<String>) -> Self {
        FrameworkError::InvalidVersion {
            moniker: moniker.into(),
        }
    }
}

impl VersionRangeError {
    /// Creates a new InvalidVersion error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        VersionRangeError::InvalidVersion {
            value: value.into(),
        }
    }

    /// Creates a new InvalidRange error
    pub fn invalid_range(value: impl Into<String>, message: impl Into<String>) -> Self {
        VersionRangeError::InvalidRange {
            value: value.into(),
            message: message.into(),
        }
    }
}

impl RestoreError {
    /// Creates a new Failed error
    pub fn failed(unit: impl Into<String>, message: impl Into<String>) -> Self {
        RestoreError::Failed {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, version: impl Into<String>) -> Self {
        RestoreError::PackageNotFound {
            package: package.into(),
            version: version.into(),
        }
    }

    /// Creates a new UnknownUnit error
    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        RestoreError::UnknownUnit { unit: unit.into() }
    }
}

impl ConfigError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl IoError {
    /// Creates a new CreateDirectory error
    pub fn create_directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::CreateDirectory {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteFile error
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
