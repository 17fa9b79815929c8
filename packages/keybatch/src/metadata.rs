//! Per-directory metadata records
//!
//! Every job directory carries `meta.json` and `meta.yaml` describing what was
//! generated and the SHA-256 of each file as written, optionally accompanied by
//! a plain-text `meta.txt`.

use crate::run_log::timestamp;
use crate::{BatchError, Result};
use keybatch_common::sha256_file;
use keybatch_key::{AlgorithmSpec, KeyBackend};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// JSON metadata file name
pub const META_JSON: &str = "meta.json";
/// YAML metadata file name
pub const META_YAML: &str = "meta.yaml";
/// Plain-text summary file name
pub const META_TXT: &str = "meta.txt";

/// Value recorded when a user or host name cannot be determined
const UNKNOWN: &str = "unknown";

/// One generated file and its content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    /// File name inside the job directory
    pub file: String,
    /// Lower-case hex SHA-256 of the file contents
    pub sha256: String,
}

/// Where and with what a run was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Login name of the invoking user
    pub user: String,
    /// Host name
    pub host: String,
    /// Backend name
    pub tool: String,
    /// Cryptographic toolkit version
    pub tool_version: String,
}

impl EnvironmentInfo {
    /// Collect environment details for `backend`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot report its tool version.
    pub fn detect<B: KeyBackend + ?Sized>(backend: &B) -> Result<Self> {
        Ok(Self {
            user: first_env(&["USER", "USERNAME"]).unwrap_or_else(|| UNKNOWN.to_string()),
            host: host_name().unwrap_or_else(|| UNKNOWN.to_string()),
            tool: backend.name().to_string(),
            tool_version: backend.tool_version()?,
        })
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

fn host_name() -> Option<String> {
    first_env(&["HOSTNAME", "COMPUTERNAME"]).or_else(|| {
        fs::read_to_string("/etc/hostname")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

/// Metadata record of one job directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Local time the record was written
    pub timestamp: String,
    /// Algorithm name (`AES`, `RSA`, `EC`, `DSA`, `ED25519`, `ED448`)
    pub algorithm: String,
    /// Job directory as given to the generator
    pub output_folder: String,
    /// Files written by the job, in write order
    pub generated_files: Vec<FileDigest>,
    /// Bit length, as a decimal string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<String>,
    /// Named curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    /// Environment details, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentInfo>,
}

impl MetadataRecord {
    /// Record for `spec` stamped with the current time
    #[must_use]
    pub fn for_job(spec: &AlgorithmSpec, dir: &Path, generated_files: Vec<FileDigest>) -> Self {
        Self {
            timestamp: timestamp(),
            algorithm: spec.algorithm().to_string(),
            output_folder: dir.display().to_string(),
            generated_files,
            bits: spec.bits().map(|bits| bits.to_string()),
            curve: spec.curve().map(str::to_string),
            environment: None,
        }
    }

    /// Attach environment details
    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Hash `files` as they currently exist in `dir`
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::MissingFile`] for a file that does not exist and
    /// [`BatchError::Io`] if reading fails.
    pub fn hash_files(dir: &Path, files: &[&str]) -> Result<Vec<FileDigest>> {
        files
            .iter()
            .map(|name| {
                let path = dir.join(name);
                let sha256 = sha256_file(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => BatchError::MissingFile(path.clone()),
                    _ => BatchError::io(&path, e),
                })?;
                Ok(FileDigest {
                    file: (*name).to_string(),
                    sha256,
                })
            })
            .collect()
    }

    /// Write `meta.json`, `meta.yaml` and, if asked, `meta.txt` into `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write(&self, dir: &Path, with_summary: bool) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_file(&dir.join(META_JSON), json.as_bytes())?;

        let yaml = serde_yaml::to_string(self)?;
        write_file(&dir.join(META_YAML), yaml.as_bytes())?;

        if with_summary {
            write_file(&dir.join(META_TXT), self.summary().as_bytes())?;
        }

        log::debug!("Wrote metadata for {} in {}", self.algorithm, dir.display());
        Ok(())
    }

    /// Read `meta.json` from `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(META_JSON);
        let json = fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BatchError::MissingFile(path.clone()),
            _ => BatchError::io(&path, e),
        })?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Plain-text rendering used for `meta.txt`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(text, "Timestamp: {}", self.timestamp);
        let _ = writeln!(text, "Algorithm: {}", self.algorithm);
        if let Some(bits) = &self.bits {
            let _ = writeln!(text, "Bits: {bits}");
        }
        if let Some(curve) = &self.curve {
            let _ = writeln!(text, "Curve: {curve}");
        }
        let _ = writeln!(text, "Output folder: {}", self.output_folder);
        if let Some(env) = &self.environment {
            let _ = writeln!(text, "User: {}", env.user);
            let _ = writeln!(text, "Host: {}", env.host);
            let _ = writeln!(text, "Tool: {} ({})", env.tool, env.tool_version);
        }
        let _ = writeln!(text, "Files:");
        for digest in &self.generated_files {
            let _ = writeln!(text, "  {}  {}", digest.sha256, digest.file);
        }
        text
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|e| BatchError::io(path, e))
}
