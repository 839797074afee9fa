//! # Task Converter Module
//!
//! Drives one file through skip check → transcode → artwork extraction →
//! artwork embedding, cleaning up partial outputs when a step fails.

use crate::{
    artwork::ArtworkHandler,
    cleanup::FailureCleaner,
    converter::task::{ConversionTask, TaskOutcome},
    file_manager::FileManager,
    tools::MediaTools,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Worker for a single conversion task
pub struct TaskConverter {
    tools: Arc<dyn MediaTools>,
    artwork: ArtworkHandler,
    force_overwrite: bool,
}

impl TaskConverter {
    pub fn new(tools: Arc<dyn MediaTools>, force_overwrite: bool) -> Self {
        Self {
            artwork: ArtworkHandler::new(tools.clone()),
            tools,
            force_overwrite,
        }
    }

    /// Convert one task; never panics and never leaves partial output behind on failure
    pub async fn convert(&self, task: &ConversionTask) -> TaskOutcome {
        let source = task.source_audio_path();
        let dest_audio = task.dest_audio_path();

        if !self.force_overwrite {
            match FileManager::file_exists(&dest_audio).await {
                Ok(true) => {
                    debug!("Output already exists: {}", dest_audio.display());
                    return TaskOutcome::Skipped;
                }
                Ok(false) => {}
                Err(e) => {
                    return TaskOutcome::Failed(format!(
                        "failed to check {}: {}",
                        dest_audio.display(),
                        e
                    ))
                }
            }
        }

        info!("{} {}", task.progress_label(), source.display());

        if let Err(e) = self.tools.transcode(&source, &dest_audio).await {
            FailureCleaner::remove_outputs(&[&dest_audio]).await;
            return TaskOutcome::Failed(format!("failed to convert to ALAC: {}", e));
        }

        let Some(artwork) = self.artwork.extract(&source, &task.dest_artwork_path()).await else {
            return TaskOutcome::Converted {
                artwork_embedded: false,
            };
        };

        match self.artwork.embed(&dest_audio, &artwork).await {
            Ok(path) => {
                debug!("Artwork saved to {}", path.display());
                TaskOutcome::Converted {
                    artwork_embedded: true,
                }
            }
            Err(e) => {
                FailureCleaner::remove_outputs(&[dest_audio.as_path(), artwork.working_path()]).await;
                TaskOutcome::Failed(format!("failed to import artwork: {}", e))
            }
        }
    }
}
