//! # Progress Tracking and Statistics Module
//!
//! - `ProgressManager`: the `indicatif` bar shown while files convert
//! - `RunSummary`: totals of a finished run, including which files failed
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [=========>------------------------------] 12/48 (25%) [12/48] converted: 01 Intro.flac
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Manages the progress bar for a conversion run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager; a hidden one draws nothing
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// A file that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub source: PathBuf,
    pub reason: String,
}

/// Totals for a finished run
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub converted: usize,
    pub artwork_embedded: usize,
    pub skipped: usize,
    pub failures: Vec<TaskFailure>,
    /// Files never started because the run aborted
    pub not_attempted: usize,
    pub aborted: bool,
    pub duration_seconds: f64,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn format_summary(&self) -> String {
        let mut summary = format!(
            "Files: {} | Converted: {} (artwork: {}) | Skipped: {} | Failed: {}",
            self.total,
            self.converted,
            self.artwork_embedded,
            self.skipped,
            self.failures.len(),
        );
        if self.aborted {
            summary.push_str(&format!(" | Aborted, {} not attempted", self.not_attempted));
        }
        summary
    }
}
