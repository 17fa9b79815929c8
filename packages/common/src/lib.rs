//! Common infrastructure shared by the keybatch crates
//!
//! - Logging bootstrap on top of `env_logger`
//! - SHA-256 content digests used for artifact integrity bookkeeping

#![forbid(unsafe_code)]

pub mod digest;
pub mod logging;

pub use digest::{sha256_file, sha256_hex};
pub use logging::LoggingTransformer;
