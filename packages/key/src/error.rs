//! Error handling for key production

use thiserror::Error;

/// Key production errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// Key generation error occurred
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Encoding a key to PEM or DER failed
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Invalid key size provided
    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize {
        /// Expected key size
        expected: usize,
        /// Actual key size
        actual: usize,
    },

    /// The backend cannot produce the requested algorithm
    #[error("Unsupported algorithm: {0}")]
    Unsupported(String),

    /// The external key-generation tool could not be started
    #[error("Key generation tool not found: {0}")]
    ToolNotFound(String),

    /// The external key-generation tool exited unsuccessfully
    #[error("`{command}` failed (exit status {status}): {stderr}")]
    ToolFailed {
        /// Command line without secrets
        command: String,
        /// Exit status, or `signal` when the process was killed
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KeyError {
    /// Create a key generation error with context
    pub fn generation(context: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        Self::KeyGeneration(format!("{context}: {error}"))
    }

    /// Create an encoding error with context
    pub fn encoding(context: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        Self::InvalidKeyFormat(format!("{context}: {error}"))
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;
