//! # Artwork Module
//!
//! Carries the cover picture of a FLAC file over to its ALAC counterpart:
//! extract it next to the output as `.jpg`, then embed it into the `.m4a`.
//!
//! ffmpeg treats `%` in an output file name as a sequence pattern, so while
//! the tools work on the artwork file its name has every `%` replaced by
//! `_percent_`. After a successful embed the file is renamed to its real
//! name. Callers only ever see the real name.
//!
//! Extraction is best effort: a source without a picture, a failed
//! extraction, or an output that is not an image just means "no artwork".

use crate::error::Result;
use crate::tools::MediaTools;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Replacement for `%` in artwork file names handed to the tools
pub const PERCENT_PLACEHOLDER: &str = "_percent_";

/// Path the tools should use for `artwork_path`.
///
/// Only the file name is escaped; parent directories already exist and are
/// never passed through ffmpeg's pattern expansion.
pub fn escaped_artwork_path(artwork_path: &Path) -> PathBuf {
    match artwork_path.file_name().and_then(|name| name.to_str()) {
        Some(name) if name.contains('%') => {
            artwork_path.with_file_name(OsString::from(name.replace('%', PERCENT_PLACEHOLDER)))
        }
        _ => artwork_path.to_path_buf(),
    }
}

/// Artwork extracted for one task, waiting to be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtwork {
    final_path: PathBuf,
    working_path: PathBuf,
}

impl ExtractedArtwork {
    /// Where the artwork ends up after a successful embed
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// File currently on disk; this is what must be removed if embedding fails
    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    fn is_escaped(&self) -> bool {
        self.final_path != self.working_path
    }
}

/// Extracts and embeds cover art through the external tools
pub struct ArtworkHandler {
    tools: Arc<dyn MediaTools>,
}

impl ArtworkHandler {
    pub fn new(tools: Arc<dyn MediaTools>) -> Self {
        Self { tools }
    }

    /// Pull the embedded picture of `source_audio` out to `artwork_path`.
    ///
    /// Returns `None` when there is nothing usable; any partial file is deleted.
    pub async fn extract(&self, source_audio: &Path, artwork_path: &Path) -> Option<ExtractedArtwork> {
        let working_path = escaped_artwork_path(artwork_path);

        if let Err(e) = self.tools.extract_artwork(source_audio, &working_path).await {
            debug!("No artwork extracted from {}: {}", source_audio.display(), e);
            Self::discard(&working_path).await;
            return None;
        }

        if !Self::is_image(&working_path).await {
            debug!("Extracted artwork is not an image: {}", working_path.display());
            Self::discard(&working_path).await;
            return None;
        }

        Some(ExtractedArtwork {
            final_path: artwork_path.to_path_buf(),
            working_path,
        })
    }

    /// Embed `artwork` into `dest_audio` and move the file to its real name
    pub async fn embed(&self, dest_audio: &Path, artwork: &ExtractedArtwork) -> Result<PathBuf> {
        self.tools.embed_artwork(dest_audio, &artwork.working_path).await?;

        if artwork.is_escaped() {
            if let Err(e) = tokio::fs::rename(&artwork.working_path, &artwork.final_path).await {
                warn!(
                    "Artwork embedded but could not be renamed {} -> {}: {}",
                    artwork.working_path.display(),
                    artwork.final_path.display(),
                    e
                );
                return Ok(artwork.working_path.clone());
            }
        }

        Ok(artwork.final_path.clone())
    }

    async fn is_image(path: &Path) -> bool {
        match tokio::fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => image::guess_format(&bytes).is_ok(),
            _ => false,
        }
    }

    async fn discard(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed partial artwork: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove partial artwork {}: {}", path.display(), e),
        }
    }
}
