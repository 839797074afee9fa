//! # Configuration Management Module
//!
//! Holds every knob the conversion pipeline reads.
//!
//! ## Parameters:
//! - `force_overwrite`: re-convert files whose `.m4a` already exists (default: false)
//! - `failure_policy`: stop at the first failed file or keep going (default: abort)
//! - `workers`: number of files converted at once (default: 1, i.e. sequential)
//! - `tool_timeout_secs`: limit for each ffmpeg / AtomicParsley call (default: 1800)
//! - `json_output`: newline-delimited JSON events on stdout (default: false)
//! - `show_progress`: draw the progress bar (default: true)
//!
//! A config can be loaded from a JSON file; command line flags are applied on top.
//!
//! ## Example:
//! ```ignore
//! let config = Config {
//!     force_overwrite: true,
//!     workers: 4,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::{ConvertError, Result as ConvertResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound for the worker pool
pub const MAX_WORKERS: usize = 64;

/// What happens to the rest of the run once a file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop dispatching new files after the first failure
    #[default]
    Abort,
    /// Attempt every file and summarise failures at the end
    Continue,
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overwrite existing outputs instead of skipping them
    pub force_overwrite: bool,
    /// Behaviour after a failed file
    pub failure_policy: FailurePolicy,
    /// Number of parallel conversions
    pub workers: usize,
    /// Timeout for a single external tool invocation, in seconds
    pub tool_timeout_secs: u64,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// Draw the progress bar
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force_overwrite: false,
            failure_policy: FailurePolicy::Abort,
            workers: 1,
            tool_timeout_secs: 1800,
            json_output: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Skip files whose output already exists
    pub fn skip_existing(&self) -> bool {
        !self.force_overwrite
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> ConvertResult<()> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConvertError::Validation(format!(
                "Number of workers must be between 1 and {}",
                MAX_WORKERS
            )));
        }

        if self.tool_timeout_secs == 0 {
            return Err(ConvertError::Validation(
                "Tool timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from file; the file must exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
