//! Encoded key material ready to be written to disk

use crate::catalogue::AlgorithmSpec;
use crate::{KeyError, Result};
use zeroize::Zeroizing;

/// One encoded output file
///
/// Contents are wiped from memory when the file is dropped.
pub struct KeyFile {
    name: &'static str,
    contents: Zeroizing<Vec<u8>>,
}

impl KeyFile {
    /// Create a file named `name` holding `contents`
    pub fn new(name: &'static str, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            contents: Zeroizing::new(contents.into()),
        }
    }

    /// File name inside the job directory
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encoded bytes
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl std::fmt::Debug for KeyFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFile")
            .field("name", &self.name)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// All files produced for one [`AlgorithmSpec`]
#[derive(Debug, Default)]
pub struct KeyArtifact {
    files: Vec<KeyFile>,
}

impl KeyArtifact {
    /// Create an empty artifact
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    #[must_use]
    pub fn with_file(mut self, name: &'static str, contents: impl Into<Vec<u8>>) -> Self {
        self.push(name, contents);
        self
    }

    /// Add a file
    pub fn push(&mut self, name: &'static str, contents: impl Into<Vec<u8>>) {
        self.files.push(KeyFile::new(name, contents));
    }

    /// Files in insertion order
    #[must_use]
    pub fn files(&self) -> &[KeyFile] {
        &self.files
    }

    /// Look up a file by name
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&KeyFile> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Check that the artifact holds exactly the files `spec` calls for
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyFormat`] naming the first missing, empty or
    /// unexpected file.
    pub fn ensure_complete(&self, spec: &AlgorithmSpec) -> Result<()> {
        let expected = spec.file_names();

        for name in expected {
            match self.file(name) {
                Some(file) if !file.contents.is_empty() => {}
                Some(_) => {
                    return Err(KeyError::InvalidKeyFormat(format!(
                        "{spec}: {name} is empty"
                    )));
                }
                None => {
                    return Err(KeyError::InvalidKeyFormat(format!(
                        "{spec}: {name} was not produced"
                    )));
                }
            }
        }

        if let Some(extra) = self.files.iter().find(|file| !expected.contains(&file.name)) {
            return Err(KeyError::InvalidKeyFormat(format!(
                "{spec}: unexpected file {}",
                extra.name
            )));
        }

        Ok(())
    }
}
