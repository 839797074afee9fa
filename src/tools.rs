//! # External Tools Module
//!
//! The pipeline never decodes audio or writes tags itself. It drives three
//! external operations through the `MediaTools` capability:
//! - `transcode`: FLAC → ALAC with ffmpeg, dropping any picture stream
//! - `extract_artwork`: dump the embedded cover to an image file with ffmpeg
//! - `embed_artwork`: write the cover into the `.m4a` with AtomicParsley
//!
//! `ExternalTools` runs the real programs, each call bounded by a timeout and
//! killed if it expires. Tests substitute `fake::FakeTools`.

use crate::error::{ConvertError, Result};
use crate::tool_resolver::ToolPathResolver;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Capability interface over the external conversion programs
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Encode `source` losslessly into ALAC at `target`, overwriting it
    async fn transcode(&self, source: &Path, target: &Path) -> Result<()>;

    /// Write the picture embedded in `source` to `target`
    async fn extract_artwork(&self, source: &Path, target: &Path) -> Result<()>;

    /// Embed `artwork` into `audio`, replacing any existing artwork tag
    async fn embed_artwork(&self, audio: &Path, artwork: &Path) -> Result<()>;
}

/// ffmpeg + AtomicParsley
pub struct ExternalTools {
    ffmpeg: PathBuf,
    atomic_parsley: PathBuf,
    timeout: Duration,
}

impl ExternalTools {
    pub fn new(ffmpeg: PathBuf, atomic_parsley: PathBuf, timeout: Duration) -> Self {
        Self {
            ffmpeg,
            atomic_parsley,
            timeout,
        }
    }

    /// Locate both programs on `PATH`
    pub fn discover(timeout: Duration) -> Result<Self> {
        let (ffmpeg, atomic_parsley) = ToolPathResolver::new().verify_tools()?;
        Ok(Self::new(ffmpeg, atomic_parsley, timeout))
    }

    fn transcode_args<'a>(source: &'a Path, target: &'a Path) -> Vec<&'a OsStr> {
        vec![
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-vn"),
            OsStr::new("-acodec"),
            OsStr::new("alac"),
            target.as_os_str(),
        ]
    }

    fn extract_args<'a>(source: &'a Path, target: &'a Path) -> Vec<&'a OsStr> {
        vec![
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-an"),
            OsStr::new("-frames:v"),
            OsStr::new("1"),
            // single image output: the target path is taken literally, no `%d` patterns
            OsStr::new("-update"),
            OsStr::new("1"),
            target.as_os_str(),
        ]
    }

    fn embed_args<'a>(audio: &'a Path, artwork: &'a Path) -> Vec<&'a OsStr> {
        vec![
            audio.as_os_str(),
            OsStr::new("--artwork"),
            artwork.as_os_str(),
            OsStr::new("--overWrite"),
        ]
    }

    /// Run a program to completion, discarding its output unless it fails
    async fn run(&self, program: &Path, args: &[&OsStr]) -> Result<()> {
        let tool = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        debug!("Running {} {:?}", tool, args);

        let start_time = std::time::Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, output)
            .await
            .map_err(|_| ConvertError::ToolTimeout {
                tool: tool.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ConvertError::ToolLaunch {
                tool: tool.clone(),
                source,
            })?;

        debug!("{} finished in {:.1}s", tool, start_time.elapsed().as_secs_f64());

        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MediaTools for ExternalTools {
    async fn transcode(&self, source: &Path, target: &Path) -> Result<()> {
        self.run(&self.ffmpeg, &Self::transcode_args(source, target)).await
    }

    async fn extract_artwork(&self, source: &Path, target: &Path) -> Result<()> {
        self.run(&self.ffmpeg, &Self::extract_args(source, target)).await
    }

    async fn embed_artwork(&self, audio: &Path, artwork: &Path) -> Result<()> {
        self.run(&self.atomic_parsley, &Self::embed_args(audio, artwork)).await
    }
}

/// Scriptable in-process stand-in for the external programs
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Smallest byte sequence `image::guess_format` recognises as JPEG
    pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    pub const ALAC_BYTES: &[u8] = b"ALAC";
    pub const EMBED_MARKER: &[u8] = b"+artwork";

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ToolCall {
        Transcode(PathBuf, PathBuf),
        ExtractArtwork(PathBuf, PathBuf),
        EmbedArtwork(PathBuf, PathBuf),
    }

    #[derive(Default)]
    pub struct FakeTools {
        calls: Mutex<Vec<ToolCall>>,
        artwork: bool,
        empty_artwork: bool,
        fail_transcode_for: Option<String>,
        fail_extract: bool,
        fail_embed: bool,
        transcode_delay: Option<Duration>,
    }

    fn fake_failure(what: &str) -> ConvertError {
        ConvertError::Io(std::io::Error::new(std::io::ErrorKind::Other, format!("fake {what} failure")))
    }

    impl FakeTools {
        pub fn new() -> Self {
            Self::default()
        }

        /// Sources carry an embedded picture
        pub fn with_artwork(mut self) -> Self {
            self.artwork = true;
            self
        }

        /// Extraction "succeeds" but leaves an empty file
        pub fn with_empty_artwork(mut self) -> Self {
            self.empty_artwork = true;
            self
        }

        /// Transcoding fails (after a partial write) for sources whose path contains `needle`
        pub fn failing_transcode_for(mut self, needle: &str) -> Self {
            self.fail_transcode_for = Some(needle.to_string());
            self
        }

        pub fn failing_extract(mut self) -> Self {
            self.fail_extract = true;
            self
        }

        pub fn failing_embed(mut self) -> Self {
            self.fail_embed = true;
            self
        }

        pub fn with_transcode_delay(mut self, delay: Duration) -> Self {
            self.transcode_delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<ToolCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn transcode_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, ToolCall::Transcode(..)))
                .count()
        }

        fn record(&self, call: ToolCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl MediaTools for FakeTools {
        async fn transcode(&self, source: &Path, target: &Path) -> Result<()> {
            self.record(ToolCall::Transcode(source.to_path_buf(), target.to_path_buf()));
            if let Some(delay) = self.transcode_delay {
                tokio::time::sleep(delay).await;
            }

            let fails = self
                .fail_transcode_for
                .as_deref()
                .is_some_and(|needle| source.to_string_lossy().contains(needle));
            if fails {
                tokio::fs::write(target, b"partial").await?;
                return Err(fake_failure("transcode"));
            }

            tokio::fs::write(target, ALAC_BYTES).await?;
            Ok(())
        }

        async fn extract_artwork(&self, source: &Path, target: &Path) -> Result<()> {
            self.record(ToolCall::ExtractArtwork(source.to_path_buf(), target.to_path_buf()));
            if self.fail_extract {
                tokio::fs::write(target, b"garbage").await?;
                return Err(fake_failure("extract"));
            }
            if self.empty_artwork {
                tokio::fs::write(target, b"").await?;
                return Ok(());
            }
            if !self.artwork {
                return Err(fake_failure("no picture stream"));
            }
            tokio::fs::write(target, JPEG_BYTES).await?;
            Ok(())
        }

        async fn embed_artwork(&self, audio: &Path, artwork: &Path) -> Result<()> {
            self.record(ToolCall::EmbedArtwork(audio.to_path_buf(), artwork.to_path_buf()));
            if self.fail_embed || !artwork.exists() {
                return Err(fake_failure("embed"));
            }
            let mut content = tokio::fs::read(audio).await?;
            content.extend_from_slice(EMBED_MARKER);
            tokio::fs::write(audio, content).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools_with_timeout(timeout: Duration) -> ExternalTools {
        ExternalTools::new(PathBuf::from("ffmpeg"), PathBuf::from("AtomicParsley"), timeout)
    }

    #[test]
    fn test_transcode_args() {
        let args = ExternalTools::transcode_args(Path::new("/in/a.flac"), Path::new("/out/a.m4a"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
        assert_eq!(
            args,
            ["-y", "-loglevel", "error", "-i", "/in/a.flac", "-vn", "-acodec", "alac", "/out/a.m4a"]
        );
    }

    #[test]
    fn test_embed_args() {
        let args = ExternalTools::embed_args(Path::new("/out/a.m4a"), Path::new("/out/a.jpg"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args, ["/out/a.m4a", "--artwork", "/out/a.jpg", "--overWrite"]);
    }

    #[test]
    fn test_extract_args_drop_audio() {
        let args = ExternalTools::extract_args(Path::new("/in/a.flac"), Path::new("/out/a.jpg"));
        assert!(args.contains(&OsStr::new("-an")));
        assert_eq!(args.last(), Some(&OsStr::new("/out/a.jpg")));
    }

    #[test]
    fn test_extract_args_write_percent_directories_literally() {
        let target = Path::new("/out/Best%d Hits/a.jpg");
        let args = ExternalTools::extract_args(Path::new("/in/a.flac"), target);
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
        let update = args.iter().position(|a| a == "-update").unwrap();
        assert_eq!(args[update + 1], "1");
        assert!(update < args.len() - 1);
        assert_eq!(args.last().unwrap(), "/out/Best%d Hits/a.jpg");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_success_and_failure() {
        let tools = tools_with_timeout(Duration::from_secs(10));
        let sh = Path::new("/bin/sh");

        tokio_test::assert_ok!(tools.run(sh, &[OsStr::new("-c"), OsStr::new("exit 0")]).await);

        let err = tools
            .run(sh, &[OsStr::new("-c"), OsStr::new("echo broken >&2; exit 3")])
            .await
            .unwrap_err();
        match err {
            ConvertError::ToolFailed { tool, stderr, status } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let tools = tools_with_timeout(Duration::from_millis(100));
        let err = tools
            .run(Path::new("/bin/sh"), &[OsStr::new("-c"), OsStr::new("sleep 5")])
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::ToolTimeout { .. }));
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let tools = tools_with_timeout(Duration::from_secs(10));
        let err = tools
            .run(Path::new("/definitely/not/here/ffmpeg"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::ToolLaunch { .. }));
    }
}
