//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with the standard log crate. Secrets never
//! pass through these helpers; only algorithm names, paths and sizes do.

use log::{debug, error, info, warn};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Logging infrastructure using `env_logger`
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging system (should be called once at application startup)
    ///
    /// Configure logging levels via `RUST_LOG` environment variable:
    /// - `RUST_LOG=debug` - Enable all debug logs, including subprocess invocations
    /// - `RUST_LOG=info` - Progress per generated key (default)
    /// - `RUST_LOG=keybatch_key=debug,keybatch=info` - Module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            )
            .format_timestamp_micros()
            .init();

            debug!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Use this in test modules to avoid initialization conflicts
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the start of a generation job
    pub fn log_job_started(algorithm: &str, parameter: Option<&str>, dir: &Path) {
        match parameter {
            Some(parameter) => info!("Generating {algorithm} ({parameter}) in {}", dir.display()),
            None => info!("Generating {algorithm} in {}", dir.display()),
        }
    }

    /// Log a written artifact file without its contents
    pub fn log_artifact_written(path: &Path, len: usize) {
        debug!("Wrote {} ({len} bytes)", path.display());
    }

    /// Log a failed job
    ///
    /// Only the error's message is logged; key material never reaches an error value.
    pub fn log_job_failed(algorithm: &str, dir: &Path, error: &dyn std::error::Error) {
        error!(
            "Key generation failed: {algorithm} -> {} ({error})",
            dir.display()
        );
    }

    /// Log an integrity problem found while verifying an output tree
    pub fn log_integrity_mismatch(path: &Path, expected: &str, actual: &str) {
        warn!(
            "Integrity mismatch: {} (recorded {expected}, found {actual})",
            path.display()
        );
    }

    /// Log timing for a completed operation
    pub fn log_performance_metric(operation: &str, elapsed: Duration, success: bool) {
        let elapsed_ms = elapsed.as_millis();
        if success {
            debug!("Performance: {operation} completed in {elapsed_ms}ms");
        } else {
            warn!("Performance: {operation} failed after {elapsed_ms}ms");
        }
    }
}
