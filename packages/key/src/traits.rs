//! Trait for key-material production backends

use crate::{AlgorithmSpec, KeyArtifact, Result};
use secrecy::SecretString;

/// A capability that turns an [`AlgorithmSpec`] into encoded key files
///
/// Implementations generate the key, encode the private half (encrypted with
/// `passphrase` when [`AlgorithmSpec::encrypts_private_key`] holds) and the
/// public half, and return every file listed by [`AlgorithmSpec::file_names`].
/// They never touch the output tree; writing, hashing and bookkeeping belong to
/// the caller.
pub trait KeyBackend {
    /// Short backend name recorded in metadata
    fn name(&self) -> &'static str;

    /// Version string of the underlying cryptographic toolkit
    ///
    /// # Errors
    ///
    /// Returns an error if the toolkit cannot report its version.
    fn tool_version(&self) -> Result<String>;

    /// Produce all files for `spec`
    ///
    /// # Errors
    ///
    /// Returns an error if generation or encoding fails, or the parameter is
    /// not supported by the toolkit.
    fn produce(&self, spec: &AlgorithmSpec, passphrase: &SecretString) -> Result<KeyArtifact>;
}

impl<B: KeyBackend + ?Sized> KeyBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn tool_version(&self) -> Result<String> {
        (**self).tool_version()
    }

    fn produce(&self, spec: &AlgorithmSpec, passphrase: &SecretString) -> Result<KeyArtifact> {
        (**self).produce(spec, passphrase)
    }
}
