//! AES Key Builder
//!
//! Raw symmetric keys carry no encoding; the key bytes are the artifact.

use crate::{KeyError, Result};
use rand::RngCore;
use zeroize::Zeroizing;

/// AES key builder - initial state
#[derive(Debug, Clone, Copy)]
pub struct AesKeyBuilder;

/// AES key builder with size configured
#[derive(Debug, Clone, Copy)]
pub struct AesKeyWithSize {
    size_bits: u32,
}

impl Default for AesKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AesKeyBuilder {
    /// Create new AES key builder
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Set AES key size (128, 192, or 256 bits)
    #[must_use]
    pub fn with_size(self, size_bits: u32) -> AesKeyWithSize {
        AesKeyWithSize { size_bits }
    }
}

impl AesKeyWithSize {
    /// Key length in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        (self.size_bits / 8) as usize
    }

    /// Check the configured size
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeySize`] unless the size is 128, 192 or 256 bits.
    pub fn validate(&self) -> Result<()> {
        if matches!(self.size_bits, 128 | 192 | 256) {
            Ok(())
        } else {
            Err(KeyError::InvalidKeySize {
                expected: 256,
                actual: self.size_bits as usize,
            })
        }
    }

    /// Generate single AES key from the thread-local CSPRNG
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeySize`] for unsupported sizes.
    pub fn generate(self) -> Result<Zeroizing<Vec<u8>>> {
        self.validate()?;

        let mut key_bytes = Zeroizing::new(vec![0u8; self.size_bytes()]);
        rand::rng().fill_bytes(&mut key_bytes);

        Ok(key_bytes)
    }
}
