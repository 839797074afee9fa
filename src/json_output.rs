//! # JSON Output Module
//!
//! Newline-delimited JSON events on stdout, for driving the converter from
//! another program.
//!
//! ## Message types:
//! - `start`: run begins, with roots and file count
//! - `file_complete`: one file reached its final state
//! - `complete`: run finished, with totals
//! - `error`: the run could not start or finish

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::task::{ConversionTask, TaskOutcome};
use crate::progress::RunSummary;

/// Evento JSON emesso durante la conversione
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        source_dir: PathBuf,
        dest_dir: PathBuf,
        total_files: usize,
    },

    #[serde(rename = "file_complete")]
    FileComplete {
        index: usize,
        total: usize,
        path: PathBuf,
        status: String,
        artwork_embedded: bool,
        error: Option<String>,
    },

    #[serde(rename = "complete")]
    Complete {
        total_files: usize,
        converted: usize,
        artwork_embedded: usize,
        skipped: usize,
        failed: usize,
        not_attempted: usize,
        aborted: bool,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(source_dir: PathBuf, dest_dir: PathBuf, total_files: usize) -> Self {
        Self::Start {
            source_dir,
            dest_dir,
            total_files,
        }
    }

    pub fn file_complete(task: &ConversionTask, outcome: &TaskOutcome) -> Self {
        let (artwork_embedded, error) = match outcome {
            TaskOutcome::Converted { artwork_embedded } => (*artwork_embedded, None),
            TaskOutcome::Skipped => (false, None),
            TaskOutcome::Failed(reason) => (false, Some(reason.clone())),
        };

        Self::FileComplete {
            index: task.index,
            total: task.total,
            path: task.source_audio_path(),
            status: outcome.status().to_string(),
            artwork_embedded,
            error,
        }
    }

    pub fn complete(summary: &RunSummary) -> Self {
        Self::Complete {
            total_files: summary.total,
            converted: summary.converted,
            artwork_embedded: summary.artwork_embedded,
            skipped: summary.skipped,
            failed: summary.failures.len(),
            not_attempted: summary.not_attempted,
            aborted: summary.aborted,
            duration_seconds: summary.duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
