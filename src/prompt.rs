//! # Prompt Module
//!
//! Terminal interaction for the binary: reading the source / destination
//! directories, turning what the user typed into absolute paths and asking
//! for confirmation before the run starts.
//!
//! The reader and writer are generic so the same code runs against stdin /
//! stdout and against in-memory buffers in tests.

use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, Write};
use std::path::{Component, Path, PathBuf};

/// Directory that collects converted libraries, next to the source directory
pub const DEFAULT_DEST_DIR_NAME: &str = "ALAC";

/// Question-and-answer helper over any line reader
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Print `label` and read one answer, surrounding whitespace removed
    pub fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.writer, "{} ", label)?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            return Err(anyhow!("No answer given (end of input)"));
        }
        Ok(line.trim().to_string())
    }

    /// Ask a yes/no question; only an explicit yes counts
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [Y/n]", question))?;
        Ok(is_affirmative(&answer))
    }

    /// Like `confirm`, but anything other than yes is an error
    pub fn require_confirmation(&mut self, question: &str) -> Result<()> {
        if !self.confirm(question)? {
            return Err(anyhow!("Cancelled by user, nothing converted"));
        }
        Ok(())
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }
}

/// `y`, `Y`, `yes`, `Yes` and `YES`
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer, "y" | "Y" | "yes" | "Yes" | "YES")
}

/// Turn a typed path into an absolute one.
///
/// Shell-escaped spaces (`\ `) become plain spaces and a leading `~` is
/// replaced with the home directory. Relative paths are resolved against the
/// current directory, then `.` and `..` are removed lexically; nothing is
/// required to exist.
pub fn normalize_user_path(input: &str) -> Result<PathBuf> {
    let home = dirs::home_dir();
    let path = expand_user_path(input, home.as_deref())?;
    if path.is_absolute() {
        return Ok(clean_path(&path));
    }

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(clean_path(&cwd.join(path)))
}

/// Drop `.` components and fold `..` into its parent without touching the filesystem
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if cleaned.file_name().is_some() {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push(component);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

fn expand_user_path(input: &str, home: Option<&Path>) -> Result<PathBuf> {
    let unescaped = input.trim().replace("\\ ", " ");
    if unescaped.is_empty() {
        return Err(anyhow!("Empty path"));
    }

    let rest = match unescaped.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(&unescaped)),
    };
    let home = home.ok_or_else(|| anyhow!("Cannot expand '~': home directory unknown"))?;
    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}

/// `<parent>/ALAC/<name>` for a source directory `<parent>/<name>`
pub fn default_destination(source: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| anyhow!("Cannot derive a destination for {}", source.display()))?;
    let parent = source.parent().unwrap_or_else(|| Path::new("/"));
    Ok(parent.join(DEFAULT_DEST_DIR_NAME).join(name))
}
