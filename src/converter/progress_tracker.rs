//! # Progress Tracking Module
//!
//! Thread-safe counters shared by every worker, plus the reporting of each
//! finished task (log line, progress bar, JSON event).

use crate::converter::task::{ConversionTask, TaskOutcome};
use crate::json_output::JsonMessage;
use crate::progress::ProgressManager;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Default)]
struct Counters {
    completed: AtomicUsize,
    converted: AtomicUsize,
    artwork_embedded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

/// Snapshot of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub converted: usize,
    pub artwork_embedded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct ProgressTracker {
    pub total_files: usize,
    counters: Arc<Counters>,
    progress_manager: ProgressManager,
    json_output: bool,
}

impl ProgressTracker {
    pub fn new(total_files: usize, show_bar: bool, json_output: bool) -> Self {
        Self {
            total_files,
            counters: Arc::new(Counters::default()),
            progress_manager: ProgressManager::new(total_files as u64, show_bar && !json_output),
            json_output,
        }
    }

    /// Count and report one finished task
    pub fn record(&self, task: &ConversionTask, outcome: &TaskOutcome) {
        let counters = &self.counters;
        counters.completed.fetch_add(1, Ordering::Relaxed);

        let source = task.source_audio_path();
        let label = task.progress_label();
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match outcome {
            TaskOutcome::Converted { artwork_embedded } => {
                counters.converted.fetch_add(1, Ordering::Relaxed);
                if *artwork_embedded {
                    counters.artwork_embedded.fetch_add(1, Ordering::Relaxed);
                }
                info!("{} converted: {}", label, source.display());
            }
            TaskOutcome::Skipped => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                info!("{} skipped: {}", label, source.display());
            }
            TaskOutcome::Failed(reason) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!("{} failed: {}: {}", label, source.display(), reason);
            }
        }

        if self.json_output {
            JsonMessage::file_complete(task, outcome).emit();
        }
        self.progress_manager
            .update(&format!("{} {}: {}", label, outcome.status(), name));
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let counters = &self.counters;
        ProgressSnapshot {
            completed: counters.completed.load(Ordering::Relaxed),
            converted: counters.converted.load(Ordering::Relaxed),
            artwork_embedded: counters.artwork_embedded.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
        }
    }

    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }
}
