//! Key production backends
//!
//! Two interchangeable realizations of [`KeyBackend`](crate::KeyBackend):
//! the linked OpenSSL library and the `openssl` executable.

pub mod cli;
pub mod library;

pub use cli::{OpensslCliBackend, CLI_BACKEND_NAME, DEFAULT_OPENSSL_PROGRAM};
pub use library::{LibraryBackend, LIBRARY_BACKEND_NAME};
