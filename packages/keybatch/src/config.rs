//! Run configuration
//!
//! Defaults come from the environment; command-line flags override them.

use crate::{BatchError, Result};
use keybatch_key::{KeyBackend, LibraryBackend, OpensslCliBackend, DEFAULT_OPENSSL_PROGRAM};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Component, Path, PathBuf};

/// Environment variable holding the private-key password
pub const PASSWORD_ENV: &str = "KEY_PASSWORD";
/// Environment variable overriding the output root
pub const OUTPUT_DIR_ENV: &str = "KEYBATCH_OUTPUT_DIR";
/// Environment variable overriding the `openssl` executable
pub const OPENSSL_ENV: &str = "KEYBATCH_OPENSSL";

/// Password used when none is configured
pub const DEFAULT_PASSWORD: &str = "password";
/// Output root used when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "keys";

/// Which key production backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    /// Linked OpenSSL library
    #[default]
    Library,
    /// `openssl` executable
    Openssl,
}

/// What to do when a job fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run at the first failure
    #[default]
    Abort,
    /// Record the failure and run the remaining jobs
    Continue,
}

/// Complete configuration of one run
#[derive(Debug)]
pub struct GeneratorConfig {
    /// Directory that is wiped and regenerated
    pub output_root: PathBuf,
    /// Password for encrypted private keys
    pub password: SecretString,
    /// Key production backend
    pub backend: BackendKind,
    /// Executable used by [`BackendKind::Openssl`]
    pub openssl_bin: PathBuf,
    /// Behaviour on job failure
    pub failure_policy: FailurePolicy,
    /// Also write `meta.txt`
    pub write_summary: bool,
    /// Record user, host and tool version in metadata
    pub record_environment: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            password: SecretString::from(DEFAULT_PASSWORD),
            backend: BackendKind::default(),
            openssl_bin: PathBuf::from(DEFAULT_OPENSSL_PROGRAM),
            failure_policy: FailurePolicy::default(),
            write_summary: false,
            record_environment: false,
        }
    }
}

impl GeneratorConfig {
    /// Build a configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(password) = lookup(PASSWORD_ENV) {
            config.password = SecretString::from(password);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            config.output_root = PathBuf::from(dir);
        }
        if let Some(program) = lookup(OPENSSL_ENV) {
            config.openssl_bin = PathBuf::from(program);
        }
        config
    }

    /// Check the configuration before any output is removed
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfig`] for an empty password, an empty
    /// output root, a filesystem root, the current directory, or a root
    /// containing a `..` component.
    pub fn validate(&self) -> Result<()> {
        if self.password.expose_secret().is_empty() {
            return Err(BatchError::InvalidConfig(format!(
                "{PASSWORD_ENV} must not be empty"
            )));
        }
        validate_output_root(&self.output_root)
    }

    /// Instantiate the configured backend
    #[must_use]
    pub fn backend(&self) -> Box<dyn KeyBackend> {
        match self.backend {
            BackendKind::Library => Box::new(LibraryBackend::new()),
            BackendKind::Openssl => Box::new(OpensslCliBackend::new(&self.openssl_bin)),
        }
    }
}

/// Reject output roots whose removal would be destructive beyond the run
pub(crate) fn validate_output_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(BatchError::InvalidConfig(
            "output directory must not be empty".to_string(),
        ));
    }
    let escapes = root
        .components()
        .any(|component| component == Component::ParentDir);
    if escapes || root.parent().is_none() || root == Path::new(".") {
        return Err(BatchError::InvalidConfig(format!(
            "refusing to use {} as output directory",
            root.display()
        )));
    }
    Ok(())
}
