//! # Path Resolution Module
//!
//! Maps source files to destination paths and replicates the destination
//! directory tree before any conversion starts.

use crate::converter::task::ConversionTask;
use crate::error::{ConvertError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Centralised destination path logic
pub struct PathResolver;

impl PathResolver {
    /// Destination path without extension for `source_file`.
    ///
    /// The final extension is stripped and the `source_root` prefix is
    /// swapped for `dest_root`, so the relative location is preserved.
    pub fn dest_base(source_root: &Path, dest_root: &Path, source_file: &Path) -> Result<PathBuf> {
        let relative = source_file
            .strip_prefix(source_root)
            .map_err(|_| ConvertError::OutsideSourceRoot {
                path: source_file.to_path_buf(),
                root: source_root.to_path_buf(),
            })?;

        let result = dest_root.join(relative.with_extension(""));
        debug!("Resolved output base: {} -> {}", source_file.display(), result.display());
        Ok(result)
    }

    /// Build the task list, preserving discovery order
    pub fn build_tasks(
        source_root: &Path,
        dest_root: &Path,
        files: &[PathBuf],
    ) -> Result<Vec<ConversionTask>> {
        let total = files.len();
        files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let dest_base = Self::dest_base(source_root, dest_root, file)?;
                Ok(ConversionTask::new(file.with_extension(""), dest_base, i + 1, total))
            })
            .collect()
    }

    /// Parent directories of every task's destination, deduplicated in first-seen order
    pub fn unique_parent_dirs(tasks: &[ConversionTask]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        tasks
            .iter()
            .filter_map(|task| task.dest_base.parent())
            .filter(|dir| seen.insert(dir.to_path_buf()))
            .map(Path::to_path_buf)
            .collect()
    }

    /// Create `dest_root` and every directory in `dirs`, including missing ancestors.
    ///
    /// Existing directories are left as they are; the first directory that
    /// cannot be created aborts with its path.
    pub async fn replicate_directories(dest_root: &Path, dirs: &[PathBuf]) -> Result<()> {
        Self::create_dir(dest_root).await?;
        for dir in dirs {
            Self::create_dir(dir).await?;
        }
        info!("Prepared {} destination directories", dirs.len());
        Ok(())
    }

    async fn create_dir(dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| ConvertError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!("Directory ready: {}", dir.display());
        Ok(())
    }
}
