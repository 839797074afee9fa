//! # File Management Module
//!
//! Discovery of FLAC files and small filesystem helpers.
//!
//! ## Operations:
//! - `find_flac_files()`: walks the source tree and collects every `.flac` file
//! - `is_flac()`: case-sensitive extension check
//! - `file_exists()`: existence check that surfaces I/O errors instead of hiding them
//!
//! ## Example:
//! ```ignore
//! let files = FileManager::find_flac_files(Path::new("/music/FLAC"))?;
//! ```

use crate::error::{ConvertError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of the files we convert
pub const INPUT_EXTENSION: &str = "flac";

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all FLAC files under `source_root`, in walk order.
    ///
    /// Entries inside a directory are visited sorted by file name so repeated
    /// runs report files in the same order. Symlinks are followed and keep
    /// their link path. Any unreadable entry, dangling link or link loop
    /// aborts the walk, and an empty result is reported as `NoInputFiles`.
    pub fn find_flac_files(source_root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(source_root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| ConvertError::Discovery {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| source_root.to_path_buf()),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if Self::is_flac(path) {
                debug!("Found FLAC file: {}", path.display());
                files.push(path.to_path_buf());
            }
        }

        if files.is_empty() {
            return Err(ConvertError::NoInputFiles(source_root.to_path_buf()));
        }

        Ok(files)
    }

    /// Check if a path has the `.flac` extension (case-sensitive)
    pub fn is_flac(path: &Path) -> bool {
        path.extension() == Some(OsStr::new(INPUT_EXTENSION))
    }

    /// Check whether something exists at `path`
    pub async fn file_exists(path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"fLaC").unwrap();
    }

    #[test]
    fn test_is_flac() {
        assert!(FileManager::is_flac(Path::new("/a/b.flac")));
        assert!(FileManager::is_flac(Path::new("/a/b.c.flac")));
        assert!(!FileManager::is_flac(Path::new("/a/b.FLAC")));
        assert!(!FileManager::is_flac(Path::new("/a/b.m4a")));
        assert!(!FileManager::is_flac(Path::new("/a/flac")));
    }

    #[test]
    fn test_find_flac_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.flac"));
        touch(&root.join("sub/b.flac"));
        touch(&root.join("sub/deeper/c.flac"));
        touch(&root.join("sub/cover.jpg"));
        touch(&root.join("notes.FLAC"));

        let files = FileManager::find_flac_files(root).unwrap();
        let found: BTreeSet<_> = files.iter().cloned().collect();
        let expected: BTreeSet<_> = [
            root.join("a.flac"),
            root.join("sub/b.flac"),
            root.join("sub/deeper/c.flac"),
        ]
        .into_iter()
        .collect();

        assert_eq!(files.len(), 3);
        assert_eq!(found, expected);
    }

    #[test]
    fn test_directories_never_returned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("album.flac")).unwrap();
        touch(&root.join("album.flac/track.flac"));

        let files = FileManager::find_flac_files(root).unwrap();
        assert_eq!(files, vec![root.join("album.flac/track.flac")]);
        assert!(files.iter().all(|f| f.is_file()));
    }

    #[test]
    fn test_discovery_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["z.flac", "m/a.flac", "a.flac", "m/z.flac", "m/n/b.flac", "m/skip.mp3"] {
            touch(&root.join(name));
        }

        let first = FileManager::find_flac_files(root).unwrap();
        let second = FileManager::find_flac_files(root).unwrap();
        assert_eq!(first, second);

        // Directory order as the filesystem returns it, no sorting
        let unsorted: BTreeSet<PathBuf> = WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file() && FileManager::is_flac(e.path()))
            .map(|e| e.into_path())
            .collect();
        let found: BTreeSet<PathBuf> = first.iter().cloned().collect();
        assert_eq!(found, unsorted);
        assert_eq!(first.len(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_flac_is_discovered_under_link_path() {
        let temp_dir = TempDir::new().unwrap();
        let library = temp_dir.path().join("library");
        let elsewhere = temp_dir.path().join("elsewhere");
        touch(&library.join("a.flac"));
        touch(&elsewhere.join("b.flac"));
        std::os::unix::fs::symlink(elsewhere.join("b.flac"), library.join("linked.flac")).unwrap();
        std::os::unix::fs::symlink(&elsewhere, library.join("linked_dir")).unwrap();

        let files = FileManager::find_flac_files(&library).unwrap();
        assert_eq!(
            files,
            vec![
                library.join("a.flac"),
                library.join("linked.flac"),
                library.join("linked_dir/b.flac"),
            ]
        );
        assert!(files.iter().all(|f| f.starts_with(&library)));
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_a_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.flac"));
        std::os::unix::fs::symlink(root.join("gone.flac"), root.join("dangling.flac")).unwrap();

        let result = FileManager::find_flac_files(root);
        match result {
            Err(ConvertError::Discovery { path, .. }) => assert_eq!(path, root.join("dangling.flac")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_a_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("sub/a.flac"));
        std::os::unix::fs::symlink(root, root.join("sub/back")).unwrap();

        let result = FileManager::find_flac_files(root);
        assert!(matches!(result, Err(ConvertError::Discovery { .. })));
    }

    #[test]
    fn test_no_input_files_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("song.mp3"));

        let result = FileManager::find_flac_files(temp_dir.path());
        assert!(matches!(result, Err(ConvertError::NoInputFiles(_))));
    }

    #[test]
    fn test_missing_root_is_a_discovery_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileManager::find_flac_files(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(ConvertError::Discovery { .. })));
    }

    #[tokio::test]
    async fn test_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.m4a");
        assert!(!FileManager::file_exists(&path).await.unwrap());
        touch(&path);
        assert!(FileManager::file_exists(&path).await.unwrap());
    }
}
