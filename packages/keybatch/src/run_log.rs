//! Append-only run log
//!
//! One line per completed job, `[<timestamp>] <message>`, closed by
//! [`COMPLETION_MARKER`] only when every job succeeded.

use crate::{BatchError, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Final line of a fully successful run
pub const COMPLETION_MARKER: &str = "=== Key Generation Complete ===";

/// Timestamp format shared by the run log and metadata
pub const TIMESTAMP_FORMAT: &str = "%a %d.%m.%Y. %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`]
#[must_use]
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Single writer for the run log
#[derive(Debug)]
pub struct RunLog<W: Write = File> {
    writer: W,
    path: PathBuf,
}

impl RunLog<File> {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BatchError::io(path, e))?;
        Ok(Self {
            writer: file,
            path: path.to_path_buf(),
        })
    }
}

impl<W: Write> RunLog<W> {
    /// Wrap an arbitrary writer; `label` names it in errors
    pub fn from_writer(writer: W, label: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            path: label.into(),
        }
    }

    /// Path (or label) of the log
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line and flush it
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Io`] if the write fails.
    pub fn record(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "[{}] {message}", timestamp())
            .and_then(|()| self.writer.flush())
            .map_err(|e| BatchError::io(&self.path, e))
    }

    /// Append the completion marker
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Io`] if the write fails.
    pub fn complete(&mut self) -> Result<()> {
        self.record(COMPLETION_MARKER)
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}
