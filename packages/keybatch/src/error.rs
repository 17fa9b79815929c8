//! Error handling for batch runs

use keybatch_key::KeyError;
use std::path::PathBuf;
use thiserror::Error;

/// Batch run errors
#[derive(Debug, Error)]
pub enum BatchError {
    /// Filesystem operation failed
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Key production failed
    #[error(transparent)]
    Key(#[from] KeyError),

    /// JSON metadata could not be serialized or parsed
    #[error("JSON metadata error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML metadata could not be serialized
    #[error("YAML metadata error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A file no longer matches the hash recorded for it
    #[error("Integrity mismatch for {}: recorded {expected}, found {actual}", file.display())]
    IntegrityMismatch {
        /// File that was checked
        file: PathBuf,
        /// Hash recorded in metadata
        expected: String,
        /// Hash of the current contents
        actual: String,
    },

    /// A file referenced by metadata does not exist
    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    /// Some jobs failed under the continue policy
    #[error("{failed} of {total} key generation jobs failed")]
    JobsFailed {
        /// Number of failed jobs
        failed: usize,
        /// Number of jobs in the run
        total: usize,
    },

    /// Configuration rejected before any output was touched
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BatchError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;
