//! # Tool Path Resolver
//!
//! Finds the external programs the converter shells out to and explains how
//! to install the ones that are missing.

use crate::error::{ConvertError, Result};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const FFMPEG: &str = "ffmpeg";
pub const ATOMIC_PARSLEY: &str = "AtomicParsley";

/// Resolves tool names against a search path
pub struct ToolPathResolver {
    search_path: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Resolver over the current `PATH`
    pub fn new() -> Self {
        let search_path = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    /// Resolver over an explicit list of directories
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        let found = self
            .search_path
            .iter()
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file());

        match &found {
            Some(path) => debug!("Resolved tool: {} -> {}", tool_name, path.display()),
            None => warn!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> std::result::Result<PathBuf, String> {
        self.resolve_tool(tool_name)
            .ok_or_else(|| Self::install_instructions(tool_name))
    }

    /// Resolve every required tool, reporting all missing ones at once
    pub fn verify_tools(&self) -> Result<(PathBuf, PathBuf)> {
        let ffmpeg = self.check_tool_with_instructions(FFMPEG);
        let atomic_parsley = self.check_tool_with_instructions(ATOMIC_PARSLEY);

        match (ffmpeg, atomic_parsley) {
            (Ok(ffmpeg), Ok(atomic_parsley)) => Ok((ffmpeg, atomic_parsley)),
            (ffmpeg, atomic_parsley) => {
                let missing: Vec<String> = [ffmpeg.err(), atomic_parsley.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                Err(ConvertError::MissingDependency(missing.join("\n\n")))
            }
        }
    }

    fn install_instructions(tool_name: &str) -> String {
        let (official, brew) = match tool_name {
            FFMPEG => ("https://www.ffmpeg.org/download.html", "brew install ffmpeg"),
            ATOMIC_PARSLEY => (
                "https://github.com/wez/atomicparsley/releases",
                "brew install atomicparsley",
            ),
            _ => ("", ""),
        };

        if cfg!(target_os = "linux") {
            let package = match tool_name {
                ATOMIC_PARSLEY => "atomicparsley",
                other => other,
            };
            format!(
                "Please install {tool_name}.\nOfficial page: {official}\nTo install on Linux, run:\n  sudo apt-get install {package}"
            )
        } else {
            format!(
                "Please install {tool_name}.\nOfficial page: {official}\nIf you are a mac user, you can install it from Homebrew: {brew}"
            )
        }
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
