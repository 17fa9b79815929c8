//! Output tree layout

use crate::config::validate_output_root;
use crate::{BatchError, Result};
use keybatch_key::{AlgorithmSpec, Family};
use std::fs;
use std::path::{Path, PathBuf};

/// Run log file name, directly under the output root
pub const LOG_FILE: &str = "keygen.log";

/// Path of the run log for `root`
#[must_use]
pub fn log_path(root: &Path) -> PathBuf {
    root.join(LOG_FILE)
}

/// Directory of `spec` under `root`
#[must_use]
pub fn job_dir(root: &Path, spec: &AlgorithmSpec) -> PathBuf {
    root.join(spec.relative_dir())
}

/// Remove any previous output tree and recreate the family skeleton
///
/// # Errors
///
/// Returns [`BatchError::InvalidConfig`] for roots that must never be removed,
/// and [`BatchError::Io`] if removal or creation fails.
pub fn prepare_output_root(root: &Path) -> Result<()> {
    validate_output_root(root)?;

    match fs::symlink_metadata(root) {
        Ok(metadata) if metadata.is_dir() => {
            log::info!("Removing previous output tree {}", root.display());
            fs::remove_dir_all(root).map_err(|e| BatchError::io(root, e))?;
        }
        Ok(_) => {
            return Err(BatchError::InvalidConfig(format!(
                "{} exists and is not a directory",
                root.display()
            )));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BatchError::io(root, e)),
    }

    for family in Family::ALL {
        let dir = root.join(family.relative_dir());
        fs::create_dir_all(&dir).map_err(|e| BatchError::io(&dir, e))?;
    }

    Ok(())
}
