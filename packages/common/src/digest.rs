//! SHA-256 content digests

use sha2::{Digest, Sha256};
use std::path::Path;

/// Compute the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// The file is read as it currently exists on disk, so the digest reflects the
/// bytes a consumer will see rather than the bytes that were meant to be written.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: impl AsRef<Path>) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
