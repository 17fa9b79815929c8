//! Shared test fixtures

#![allow(dead_code)]

use keybatch_key::{AlgorithmSpec, KeyArtifact, KeyBackend, KeyError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

pub const FAKE_BACKEND_NAME: &str = "fake";

/// Deterministic backend that writes labelled placeholder files
#[derive(Debug, Default)]
pub struct FakeBackend {
    fail_on: Option<AlgorithmSpec>,
}

impl FakeBackend {
    pub fn failing_on(spec: AlgorithmSpec) -> Self {
        Self {
            fail_on: Some(spec),
        }
    }
}

impl KeyBackend for FakeBackend {
    fn name(&self) -> &'static str {
        FAKE_BACKEND_NAME
    }

    fn tool_version(&self) -> Result<String> {
        Ok("Fake 1.0".to_string())
    }

    fn produce(&self, spec: &AlgorithmSpec, passphrase: &SecretString) -> Result<KeyArtifact> {
        if self.fail_on == Some(*spec) {
            return Err(KeyError::KeyGeneration(format!("{spec} refused")));
        }

        let mut artifact = KeyArtifact::new();
        for &name in spec.file_names() {
            let contents = match spec {
                AlgorithmSpec::Aes { bits } => vec![0x5a; (*bits / 8) as usize],
                _ => format!("{spec}:{name}:{}", passphrase.expose_secret().len()).into_bytes(),
            };
            artifact.push(name, contents);
        }
        Ok(artifact)
    }
}

/// Run-log lines of `root`
pub fn log_lines(root: &Path) -> Vec<String> {
    std::fs::read_to_string(root.join("keygen.log"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Message part of a run-log line, after the `[timestamp] ` prefix
pub fn message(line: &str) -> &str {
    line.split_once("] ").map(|(_, message)| message).unwrap()
}
