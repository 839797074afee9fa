//! # Batch Converter
//!
//! Orchestratore principale: discovery → path mapping → directory tree →
//! conversion of every task, sequentially or through a bounded worker pool.
//!
//! ## Failure policy:
//! - `FailurePolicy::Abort`: once a file fails no new file is started; files
//!   already running finish. The summary is marked aborted.
//! - `FailurePolicy::Continue`: every file is attempted and failures are
//!   listed in the summary.
//!
//! Setup problems (missing source, nothing to convert, uncreatable
//! destination directory) are returned as errors before anything is written.
//! Per-file failures never terminate the run from here; the caller decides
//! the exit status from `RunSummary::is_success`.

use crate::{
    config::{Config, FailurePolicy},
    converter::{
        path_resolver::PathResolver,
        progress_tracker::ProgressTracker,
        task::{ConversionTask, TaskOutcome},
        task_converter::TaskConverter,
    },
    error::{ConvertError, Result},
    file_manager::FileManager,
    json_output::JsonMessage,
    progress::{RunSummary, TaskFailure},
    tools::MediaTools,
};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Everything known before the first byte is written
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub tasks: Vec<ConversionTask>,
    /// Destination directories to create, first-seen order
    pub directories: Vec<PathBuf>,
}

impl ConversionPlan {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Converts a whole source tree
pub struct BatchConverter {
    config: Config,
    tools: Arc<dyn MediaTools>,
}

impl BatchConverter {
    pub fn new(config: Config, tools: Arc<dyn MediaTools>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, tools })
    }

    /// Discover the input files and derive every task
    pub async fn prepare(&self, source_root: &Path, dest_root: &Path) -> Result<ConversionPlan> {
        let is_dir = tokio::fs::metadata(source_root)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ConvertError::SourceNotFound(source_root.to_path_buf()));
        }

        info!("Searching FLAC files in {}", source_root.display());
        let files = FileManager::find_flac_files(source_root)?;
        info!("Found {} FLAC files", files.len());

        let tasks = PathResolver::build_tasks(source_root, dest_root, &files)?;
        let directories = PathResolver::unique_parent_dirs(&tasks);

        Ok(ConversionPlan {
            source_root: source_root.to_path_buf(),
            dest_root: dest_root.to_path_buf(),
            tasks,
            directories,
        })
    }

    /// Prepare and execute in one go
    pub async fn run(&self, source_root: &Path, dest_root: &Path) -> Result<RunSummary> {
        let plan = self.prepare(source_root, dest_root).await?;
        self.execute(plan).await
    }

    /// Create the destination tree, then convert every task of `plan`
    pub async fn execute(&self, plan: ConversionPlan) -> Result<RunSummary> {
        let start_time = Instant::now();
        let total = plan.len();

        PathResolver::replicate_directories(&plan.dest_root, &plan.directories).await?;

        if self.config.json_output {
            JsonMessage::start(plan.source_root.clone(), plan.dest_root.clone(), total).emit();
        }
        self.log_configuration(&plan);

        let tracker = ProgressTracker::new(total, self.config.show_progress, self.config.json_output);
        let converter = Arc::new(TaskConverter::new(self.tools.clone(), self.config.force_overwrite));
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let abort = Arc::new(AtomicBool::new(false));
        let policy = self.config.failure_policy;

        let mut sources = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for task in plan.tasks {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            if abort.load(Ordering::SeqCst) {
                debug!("Run aborted, not starting {}", task.source_audio_path().display());
                break;
            }

            let converter = converter.clone();
            let tracker = tracker.clone();
            let abort = abort.clone();
            sources.push(task.source_audio_path());

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = converter.convert(&task).await;
                if outcome.is_failure() && policy == FailurePolicy::Abort {
                    abort.store(true, Ordering::SeqCst);
                }
                tracker.record(&task, &outcome);
                outcome
            }));
        }

        let mut summary = RunSummary {
            total,
            not_attempted: total - handles.len(),
            ..Default::default()
        };

        for (source, result) in sources.into_iter().zip(join_all(handles).await) {
            match result {
                Ok(TaskOutcome::Converted { artwork_embedded }) => {
                    summary.converted += 1;
                    if artwork_embedded {
                        summary.artwork_embedded += 1;
                    }
                }
                Ok(TaskOutcome::Skipped) => summary.skipped += 1,
                Ok(TaskOutcome::Failed(reason)) => summary.failures.push(TaskFailure { source, reason }),
                Err(e) => {
                    error!("Conversion task panicked for {}: {}", source.display(), e);
                    summary.failures.push(TaskFailure {
                        source,
                        reason: format!("conversion task panicked: {}", e),
                    });
                }
            }
        }

        summary.aborted = abort.load(Ordering::SeqCst);
        summary.duration_seconds = start_time.elapsed().as_secs_f64();

        tracker.finish(&summary.format_summary());
        if self.config.json_output {
            JsonMessage::complete(&summary).emit();
        }
        self.print_final_stats(&summary);

        Ok(summary)
    }

    fn log_configuration(&self, plan: &ConversionPlan) {
        if self.config.json_output {
            return;
        }

        info!("src: {}", plan.source_root.display());
        info!("dst: {}", plan.dest_root.display());
        if self.config.skip_existing() {
            info!("Skip mode: files whose .m4a already exists are left alone");
        } else {
            info!("Overwrite mode: existing outputs are converted again");
        }
        match self.config.failure_policy {
            FailurePolicy::Abort => info!("Failure policy: stop at the first failed file"),
            FailurePolicy::Continue => info!("Failure policy: keep going after failed files"),
        }
        if self.config.workers > 1 {
            info!("Workers: {}", self.config.workers);
        }
    }

    fn print_final_stats(&self, summary: &RunSummary) {
        if self.config.json_output {
            return;
        }

        info!("=== Conversion Complete ===");
        info!("{}", summary.format_summary());
        info!("Elapsed: {:.1}s", summary.duration_seconds);
        for failure in &summary.failures {
            warn!("Failed: {}: {}", failure.source.display(), failure.reason);
        }
    }
}
