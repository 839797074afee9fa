//! # Conversion Task
//!
//! One FLAC file's unit of work and its terminal outcome.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const SOURCE_AUDIO_SUFFIX: &str = ".flac";
pub const DEST_AUDIO_SUFFIX: &str = ".m4a";
pub const DEST_ARTWORK_SUFFIX: &str = ".jpg";

/// A single file to convert, with its position in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    /// Source file path without extension
    pub source_base: PathBuf,
    /// Destination file path without extension
    pub dest_base: PathBuf,
    /// 1-based position in discovery order
    pub index: usize,
    /// Number of tasks in the run
    pub total: usize,
}

impl ConversionTask {
    pub fn new(source_base: PathBuf, dest_base: PathBuf, index: usize, total: usize) -> Self {
        Self {
            source_base,
            dest_base,
            index,
            total,
        }
    }

    pub fn source_audio_path(&self) -> PathBuf {
        with_suffix(&self.source_base, SOURCE_AUDIO_SUFFIX)
    }

    pub fn dest_audio_path(&self) -> PathBuf {
        with_suffix(&self.dest_base, DEST_AUDIO_SUFFIX)
    }

    pub fn dest_artwork_path(&self) -> PathBuf {
        with_suffix(&self.dest_base, DEST_ARTWORK_SUFFIX)
    }

    /// `[3/12]` style progress prefix
    pub fn progress_label(&self) -> String {
        format!("[{}/{}]", self.index, self.total)
    }
}

/// Appends a suffix to the raw path, leaving any dots in the name alone.
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = base.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Terminal state of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Converted { artwork_embedded: bool },
    Skipped,
    Failed(String),
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    /// Short status word used in logs and JSON events
    pub fn status(&self) -> &'static str {
        match self {
            TaskOutcome::Converted { .. } => "converted",
            TaskOutcome::Skipped => "skipped",
            TaskOutcome::Failed(_) => "failed",
        }
    }
}
