//! Integrity verification of an existing output tree

use crate::metadata::{MetadataRecord, META_JSON};
use crate::{BatchError, Result};
use keybatch_common::{sha256_file, LoggingTransformer};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of verifying an output tree
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Directories carrying a metadata record
    pub directories: Vec<PathBuf>,
    /// Files whose hash was checked
    pub files_checked: usize,
    /// Missing files and hash mismatches
    pub problems: Vec<BatchError>,
}

impl VerifyReport {
    /// Whether every recorded file is present and unchanged
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Re-hash every file listed in every `meta.json` below `root`
///
/// # Errors
///
/// Returns an error if `root` cannot be walked or a metadata record cannot be
/// read. Missing files and mismatches are collected in the report instead.
pub fn verify_tree(root: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    let mut records = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            BatchError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && entry.file_name() == META_JSON {
            if let Some(dir) = entry.path().parent() {
                records.push(dir.to_path_buf());
            }
        }
    }

    for dir in records {
        let record = MetadataRecord::read(&dir)?;
        for digest in &record.generated_files {
            let path = dir.join(&digest.file);
            report.files_checked += 1;
            match sha256_file(&path) {
                Ok(actual) if actual == digest.sha256 => {}
                Ok(actual) => {
                    LoggingTransformer::log_integrity_mismatch(&path, &digest.sha256, &actual);
                    report.problems.push(BatchError::IntegrityMismatch {
                        file: path,
                        expected: digest.sha256.clone(),
                        actual,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("Missing file: {}", path.display());
                    report.problems.push(BatchError::MissingFile(path));
                }
                Err(e) => return Err(BatchError::io(path, e)),
            }
        }
        report.directories.push(dir);
    }

    log::info!(
        "Verified {} files in {} directories below {}",
        report.files_checked,
        report.directories.len(),
        root.display()
    );
    Ok(report)
}
