//! # Keybatch Key Production
//!
//! The static catalogue of generation jobs and the backends that turn each job
//! into encoded key files.
//!
//! ## Features
//!
//! - **Catalogue**: AES, RSA, EC, DSA and EdDSA jobs with a deterministic layout
//! - **Backends**: in-process OpenSSL library or the `openssl` executable
//! - **Encoding**: PKCS#8 private keys (password-encrypted where required),
//!   SubjectPublicKeyInfo public keys, PEM and DER
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keybatch_key::{KeyBackend, LibraryBackend, CATALOGUE};
//! use secrecy::SecretString;
//!
//! # fn main() -> keybatch_key::Result<()> {
//! let backend = LibraryBackend::new();
//! let password = SecretString::from("password");
//!
//! for spec in &CATALOGUE {
//!     let artifact = backend.produce(spec, &password)?;
//!     artifact.ensure_complete(spec)?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod backend;
pub mod catalogue;
pub mod encoding;
pub mod error;
pub mod symmetric;
pub mod traits;

// Re-export core types
pub use artifact::{KeyArtifact, KeyFile};
pub use catalogue::{AlgorithmSpec, EdwardsCurve, Family, NamedCurve, CATALOGUE};
pub use error::{KeyError, Result};
pub use symmetric::AesKeyBuilder;
pub use traits::KeyBackend;

// Re-export the backends
pub use backend::{
    LibraryBackend, OpensslCliBackend, CLI_BACKEND_NAME, DEFAULT_OPENSSL_PROGRAM,
    LIBRARY_BACKEND_NAME,
};
