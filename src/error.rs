//! # Error Types Module
//!
//! Defines the typed errors produced by the conversion pipeline.
//!
//! ## Categories:
//! - Setup errors (`SourceNotFound`, `Discovery`, `NoInputFiles`,
//!   `DirectoryCreation`): abort the run before anything is converted
//! - Tool errors (`ToolLaunch`, `ToolFailed`, `ToolTimeout`): fail a single task
//! - `MissingDependency`: ffmpeg or AtomicParsley not installed
//! - `Validation`: bad configuration values
//!
//! The binary wraps these into `anyhow::Error` for reporting.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Custom error types for the conversion pipeline
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No FLAC files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("{} is not inside source directory {}", .path.display(), .root.display())]
    OutsideSourceRoot { path: PathBuf, root: PathBuf },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
