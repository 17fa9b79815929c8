//! The key-artifact production pipeline
//!
//! One routine applied to every [`AlgorithmSpec`] of the catalogue: produce the
//! artifact through a [`KeyBackend`], write its files, hash them back from disk,
//! write the metadata record and append a line to the run log.

use crate::config::{FailurePolicy, GeneratorConfig, DEFAULT_PASSWORD};
use crate::layout::{job_dir, log_path, prepare_output_root};
use crate::metadata::{EnvironmentInfo, MetadataRecord};
use crate::run_log::RunLog;
use crate::{BatchError, Result};
use keybatch_common::LoggingTransformer;
use keybatch_key::{AlgorithmSpec, KeyBackend, KeyFile, LibraryBackend, CATALOGUE};
use secrecy::SecretString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A job that finished and the directory it wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// The job
    pub spec: AlgorithmSpec,
    /// Directory holding its files and metadata
    pub dir: PathBuf,
}

/// A job that failed under [`FailurePolicy::Continue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// The job
    pub spec: AlgorithmSpec,
    /// Directory the job was writing
    pub dir: PathBuf,
    /// Rendered error
    pub error: String,
}

/// Summary of a run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Jobs that completed, in run order
    pub completed: Vec<JobOutcome>,
    /// Jobs that failed, in run order
    pub failed: Vec<JobFailure>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunReport {
    /// Whether every job succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Batch generator over an output root
///
/// ```rust,no_run
/// use keybatch::KeyBatch;
/// use keybatch_key::LibraryBackend;
///
/// # fn main() -> keybatch::Result<()> {
/// let report = KeyBatch::at("keys")
///     .with_backend(LibraryBackend::new())
///     .with_password("password")
///     .generate()?;
/// println!("{} keys", report.completed.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct KeyBatch<B: KeyBackend = Box<dyn KeyBackend>> {
    root: PathBuf,
    backend: B,
    password: SecretString,
    jobs: Vec<AlgorithmSpec>,
    failure_policy: FailurePolicy,
    write_summary: bool,
    record_environment: bool,
}

impl KeyBatch<LibraryBackend> {
    /// Generator writing below `root`, using the library backend and the full catalogue
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backend: LibraryBackend::new(),
            password: SecretString::from(DEFAULT_PASSWORD),
            jobs: CATALOGUE.to_vec(),
            failure_policy: FailurePolicy::default(),
            write_summary: false,
            record_environment: false,
        }
    }
}

impl KeyBatch {
    /// Generator fully described by `config`
    #[must_use]
    pub fn from_config(config: GeneratorConfig) -> Self {
        let backend = config.backend();
        KeyBatch::at(config.output_root)
            .with_backend(backend)
            .with_password(config.password)
            .with_failure_policy(config.failure_policy)
            .with_summary(config.write_summary)
            .with_environment(config.record_environment)
    }
}

impl<B: KeyBackend> KeyBatch<B> {
    /// Use `backend` for key production
    pub fn with_backend<C: KeyBackend>(self, backend: C) -> KeyBatch<C> {
        KeyBatch {
            root: self.root,
            backend,
            password: self.password,
            jobs: self.jobs,
            failure_policy: self.failure_policy,
            write_summary: self.write_summary,
            record_environment: self.record_environment,
        }
    }

    /// Password for encrypted private keys
    #[must_use]
    pub fn with_password(mut self, password: impl Into<SecretString>) -> Self {
        self.password = password.into();
        self
    }

    /// Restrict the run to `jobs`, in the given order
    #[must_use]
    pub fn with_jobs(mut self, jobs: impl IntoIterator<Item = AlgorithmSpec>) -> Self {
        self.jobs = jobs.into_iter().collect();
        self
    }

    /// Behaviour on job failure
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Also write `meta.txt` in every job directory
    #[must_use]
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.write_summary = enabled;
        self
    }

    /// Record user, host and tool version in metadata
    #[must_use]
    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.record_environment = enabled;
        self
    }

    /// Output root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the run log
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        log_path(&self.root)
    }

    /// Wipe the output root and run every job
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Abort`], the first job error. Under
    /// [`FailurePolicy::Continue`], [`BatchError::JobsFailed`] once all jobs ran.
    /// In both cases the run log ends without the completion marker.
    pub fn generate(&self) -> Result<RunReport> {
        prepare_output_root(&self.root)?;
        let mut log = RunLog::open(self.log_path())?;
        self.run(&mut log)
    }

    /// Run every job against an existing output root, logging to `log`
    ///
    /// # Errors
    ///
    /// See [`KeyBatch::generate`].
    pub fn run<W: Write>(&self, log: &mut RunLog<W>) -> Result<RunReport> {
        let started = Instant::now();
        log::info!(
            "Generating {} keys below {} with {}",
            self.jobs.len(),
            self.root.display(),
            self.backend.name()
        );

        let environment = if self.record_environment {
            Some(EnvironmentInfo::detect(&self.backend)?)
        } else {
            None
        };

        let mut report = RunReport::default();
        for spec in &self.jobs {
            let dir = job_dir(&self.root, spec);
            match self.run_job(spec, &dir, environment.as_ref(), log) {
                Ok(()) => report.completed.push(JobOutcome {
                    spec: *spec,
                    dir,
                }),
                Err(error) => {
                    LoggingTransformer::log_job_failed(spec.algorithm(), &dir, &error);
                    if self.failure_policy == FailurePolicy::Abort {
                        return Err(error);
                    }
                    log.record(&format!("FAILED {spec} -> {}: {error}", dir.display()))?;
                    report.failed.push(JobFailure {
                        spec: *spec,
                        dir,
                        error: error.to_string(),
                    });
                }
            }
        }
        report.elapsed = started.elapsed();

        let success = report.is_success();
        LoggingTransformer::log_performance_metric("key batch", report.elapsed, success);
        if !success {
            return Err(BatchError::JobsFailed {
                failed: report.failed.len(),
                total: self.jobs.len(),
            });
        }

        log.complete()?;
        Ok(report)
    }

    /// Produce, write, hash and record one job
    fn run_job<W: Write>(
        &self,
        spec: &AlgorithmSpec,
        dir: &Path,
        environment: Option<&EnvironmentInfo>,
        log: &mut RunLog<W>,
    ) -> Result<()> {
        let started = Instant::now();
        let parameter = spec
            .bits()
            .map(|bits| format!("{bits} bits"))
            .or_else(|| spec.curve().map(str::to_string));
        LoggingTransformer::log_job_started(spec.algorithm(), parameter.as_deref(), dir);

        std::fs::create_dir_all(dir).map_err(|e| BatchError::io(dir, e))?;

        let artifact = self.backend.produce(spec, &self.password)?;
        artifact.ensure_complete(spec)?;

        let mut written = Vec::with_capacity(artifact.files().len());
        for file in artifact.files() {
            write_key_file(dir, file)?;
            written.push(file.name());
        }

        let digests = MetadataRecord::hash_files(dir, &written)?;
        let mut record = MetadataRecord::for_job(spec, dir, digests);
        if let Some(environment) = environment {
            record = record.with_environment(environment.clone());
        }
        record.write(dir, self.write_summary)?;

        log.record(&spec.completion_message(dir))?;
        LoggingTransformer::log_performance_metric(&spec.to_string(), started.elapsed(), true);
        Ok(())
    }
}

/// Files holding secret material
#[cfg(unix)]
fn is_secret(name: &str) -> bool {
    use keybatch_key::catalogue::{KEY_BIN, PRIVATE_KEY_DER, PRIVATE_KEY_PEM};
    matches!(name, KEY_BIN | PRIVATE_KEY_PEM | PRIVATE_KEY_DER)
}

fn write_key_file(dir: &Path, file: &KeyFile) -> Result<()> {
    let path = dir.join(file.name());

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    if is_secret(file.name()) {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600); // Owner read/write only
    }

    let mut handle = options.open(&path).map_err(|e| BatchError::io(&path, e))?;
    handle
        .write_all(file.contents())
        .and_then(|()| handle.sync_all())
        .map_err(|e| BatchError::io(&path, e))?;

    LoggingTransformer::log_artifact_written(&path, file.contents().len());
    Ok(())
}
