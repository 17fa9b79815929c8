//! # Keybatch
//!
//! Batch generator for a standard set of cryptographic keys.
//!
//! A run wipes the output root, then produces AES, RSA, EC, DSA and EdDSA keys
//! in a fixed order. Each key lands in its own directory together with
//! `meta.json`/`meta.yaml` records carrying the SHA-256 of every file, and each
//! completed job appends a line to `keygen.log`. The log ends with
//! `=== Key Generation Complete ===` only when every job succeeded.
//!
//! ```rust,no_run
//! use keybatch::{GeneratorConfig, KeyBatch};
//!
//! # fn main() -> keybatch::Result<()> {
//! let config = GeneratorConfig::from_env();
//! config.validate()?;
//! let batch = KeyBatch::from_config(config);
//! batch.generate()?;
//! println!("See: {}", batch.log_path().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod pipeline;
pub mod run_log;
pub mod verify;

pub use config::{BackendKind, FailurePolicy, GeneratorConfig};
pub use error::{BatchError, Result};
pub use metadata::{EnvironmentInfo, FileDigest, MetadataRecord};
pub use pipeline::{JobFailure, JobOutcome, KeyBatch, RunReport};
pub use run_log::{RunLog, COMPLETION_MARKER};
pub use verify::{verify_tree, VerifyReport};
