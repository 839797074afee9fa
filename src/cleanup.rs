//! # Failure Cleanup
//!
//! Removes whatever a failed step left behind so no broken `.m4a` or `.jpg`
//! survives in the destination tree. Cleanup is best effort: problems are
//! logged and reported, never returned as errors.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What happened to one candidate path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    Removed,
    NotPresent,
    Failed(String),
}

/// Per-path result of a cleanup pass, in input order
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub entries: Vec<(PathBuf, CleanupAction)>,
}

impl CleanupReport {
    pub fn removed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, action)| *action == CleanupAction::Removed)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, action)| matches!(action, CleanupAction::Failed(_)))
    }
}

pub struct FailureCleaner;

impl FailureCleaner {
    /// Delete every path in `outputs` that exists
    pub async fn remove_outputs<P: AsRef<Path>>(outputs: &[P]) -> CleanupReport {
        let mut report = CleanupReport::default();
        if outputs.is_empty() {
            return report;
        }

        info!("Deleting broken output files...");
        for (i, output) in outputs.iter().enumerate() {
            let output = output.as_ref();
            let action = Self::remove_one(output).await;
            match &action {
                CleanupAction::Removed => {
                    info!("[{}/{}] deleted: {}", i + 1, outputs.len(), output.display())
                }
                CleanupAction::NotPresent => {
                    info!("[{}/{}] file does not exist: {}", i + 1, outputs.len(), output.display())
                }
                CleanupAction::Failed(reason) => {
                    warn!("[{}/{}] could not delete {}: {}", i + 1, outputs.len(), output.display(), reason)
                }
            }
            report.entries.push((output.to_path_buf(), action));
        }

        report
    }

    async fn remove_one(path: &Path) -> CleanupAction {
        match tokio::fs::try_exists(path).await {
            Ok(false) => return CleanupAction::NotPresent,
            Ok(true) => {}
            Err(e) => return CleanupAction::Failed(e.to_string()),
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => CleanupAction::Removed,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CleanupAction::NotPresent,
            Err(e) => CleanupAction::Failed(e.to_string()),
        }
    }
}
