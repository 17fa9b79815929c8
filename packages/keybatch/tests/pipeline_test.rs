//! Tests for the key-artifact production pipeline

mod common;

use common::{log_lines, message, FakeBackend, FAKE_BACKEND_NAME};
use keybatch::metadata::{META_JSON, META_TXT, META_YAML};
use keybatch::{
    BatchError, FailurePolicy, KeyBatch, MetadataRecord, RunLog, COMPLETION_MARKER,
};
use keybatch_common::{sha256_file, LoggingTransformer};
use keybatch_key::{AlgorithmSpec, KeyError, NamedCurve, CATALOGUE};
use std::fs;
use std::path::Path;

const RSA_3072: AlgorithmSpec = AlgorithmSpec::Rsa { bits: 3072 };

fn fake_batch(root: &Path) -> KeyBatch<FakeBackend> {
    LoggingTransformer::init_test();
    KeyBatch::at(root).with_backend(FakeBackend::default())
}

#[test]
fn test_full_run_produces_catalogue_layout() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");

    let report = fake_batch(&root).generate().unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), 13);

    let mut top: Vec<String> = fs::read_dir(&root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    top.sort();
    assert_eq!(
        top,
        vec!["asymmetric-encryption", "keygen.log", "symmetric-encryption"]
    );

    for (outcome, spec) in report.completed.iter().zip(CATALOGUE.iter()) {
        assert_eq!(&outcome.spec, spec);
        assert_eq!(outcome.dir, root.join(spec.relative_dir()));

        let mut expected: Vec<&str> = spec.file_names().to_vec();
        expected.extend([META_JSON, META_YAML]);
        expected.sort_unstable();

        let mut names: Vec<String> = fs::read_dir(&outcome.dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, expected, "{spec}");
    }

    let aes = fs::read(root.join("symmetric-encryption/AES/AES192/key.bin")).unwrap();
    assert_eq!(aes.len(), 24);
}

#[test]
fn test_metadata_hashes_match_files_on_disk() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    let report = fake_batch(&root).generate().unwrap();

    for outcome in &report.completed {
        let record = MetadataRecord::read(&outcome.dir).unwrap();
        let files: Vec<&str> = record
            .generated_files
            .iter()
            .map(|digest| digest.file.as_str())
            .collect();
        assert_eq!(files, outcome.spec.file_names());

        for digest in &record.generated_files {
            let actual = sha256_file(outcome.dir.join(&digest.file)).unwrap();
            assert_eq!(actual, digest.sha256);
        }

        let yaml = fs::read_to_string(outcome.dir.join(META_YAML)).unwrap();
        let from_yaml: MetadataRecord = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(from_yaml, record);
    }
}

#[test]
fn test_metadata_fields_per_family() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    fake_batch(&root).generate().unwrap();

    let aes_dir = root.join("symmetric-encryption/AES/AES128");
    let aes = MetadataRecord::read(&aes_dir).unwrap();
    assert_eq!(aes.algorithm, "AES");
    assert_eq!(aes.bits.as_deref(), Some("128"));
    assert_eq!(aes.curve, None);
    assert_eq!(aes.output_folder, aes_dir.display().to_string());
    assert!(aes.environment.is_none());

    let aes_json = fs::read_to_string(aes_dir.join(META_JSON)).unwrap();
    assert!(aes_json.starts_with("{\n  \"timestamp\": "));
    assert!(aes_json.contains("\"bits\": \"128\""));
    assert!(!aes_json.contains("curve"));
    assert!(!aes_json.contains("environment"));

    let ec = MetadataRecord::read(&root.join("asymmetric-encryption/EC-Curves/EC_secp384r1"))
        .unwrap();
    assert_eq!(ec.algorithm, "EC");
    assert_eq!(ec.bits, None);
    assert_eq!(ec.curve.as_deref(), Some("secp384r1"));

    let dsa = MetadataRecord::read(&root.join("asymmetric-encryption/DSA/DSA2048")).unwrap();
    assert_eq!(dsa.algorithm, "DSA");
    assert_eq!(dsa.bits.as_deref(), Some("2048"));

    let ed = MetadataRecord::read(&root.join("asymmetric-encryption/EdDSA/ED448")).unwrap();
    assert_eq!(ed.algorithm, "ED448");
    assert_eq!(ed.bits, None);
    assert_eq!(ed.curve, None);
}

#[test]
fn test_run_log_lines_and_completion_marker() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    fake_batch(&root).generate().unwrap();

    let lines = log_lines(&root);
    assert_eq!(lines.len(), 14);

    let aes_dir = root.join("symmetric-encryption/AES/AES128");
    assert_eq!(
        message(&lines[0]),
        format!("Generated AES 128-bit key -> {}", aes_dir.display())
    );
    assert!(message(&lines[3]).starts_with("Generated RSA 2048-bit key pair -> "));
    assert!(message(&lines[6]).starts_with("Generated EC prime256v1 key -> "));
    assert!(message(&lines[10]).starts_with("Generated DSA 2048-bit key -> "));
    assert!(message(&lines[12]).starts_with("Generated ED448 key -> "));
    assert_eq!(message(&lines[13]), COMPLETION_MARKER);

    for line in &lines {
        let (stamp, _) = line
            .strip_prefix('[')
            .and_then(|rest| rest.split_once("] "))
            .unwrap();
        chrono::NaiveDateTime::parse_from_str(stamp, "%a %d.%m.%Y. %H:%M:%S").unwrap();
    }
}

#[test]
fn test_second_run_replaces_previous_tree() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    let batch = fake_batch(&root);

    batch.generate().unwrap();
    let stale_dir = root.join("asymmetric-encryption/RSA/RSA1024");
    fs::create_dir_all(&stale_dir).unwrap();
    fs::write(stale_dir.join("private_key.pem"), b"stale").unwrap();
    fs::write(root.join("notes.txt"), b"stale").unwrap();

    batch.generate().unwrap();
    assert!(!stale_dir.exists());
    assert!(!root.join("notes.txt").exists());
    assert_eq!(log_lines(&root).len(), 14);
}

#[test]
fn test_failure_aborts_run_without_marker() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");

    let err = fake_batch(&root)
        .with_backend(FakeBackend::failing_on(RSA_3072))
        .generate()
        .unwrap_err();
    assert!(matches!(err, BatchError::Key(KeyError::KeyGeneration(_))));

    let lines = log_lines(&root);
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| message(line) != COMPLETION_MARKER));

    // Jobs after the failure never ran; the family skeleton still exists
    assert!(root.join("asymmetric-encryption/RSA/RSA2048/meta.json").exists());
    assert!(!root.join("asymmetric-encryption/RSA/RSA4096").exists());
    assert!(root.join("asymmetric-encryption/EC-Curves").is_dir());
    assert!(!root.join("asymmetric-encryption/EC-Curves/EC_prime256v1").exists());
}

#[test]
fn test_keep_going_runs_remaining_jobs() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");

    let err = fake_batch(&root)
        .with_backend(FakeBackend::failing_on(RSA_3072))
        .with_failure_policy(FailurePolicy::Continue)
        .generate()
        .unwrap_err();
    assert!(matches!(
        err,
        BatchError::JobsFailed {
            failed: 1,
            total: 13
        }
    ));

    let lines = log_lines(&root);
    assert_eq!(lines.len(), 13);
    let failed_dir = root.join("asymmetric-encryption/RSA/RSA3072");
    assert!(message(&lines[4]).starts_with(&format!(
        "FAILED RSA-3072 -> {}: ",
        failed_dir.display()
    )));
    assert!(lines.iter().all(|line| message(line) != COMPLETION_MARKER));

    assert!(!failed_dir.join(META_JSON).exists());
    assert!(root
        .join("asymmetric-encryption/EdDSA/ED448")
        .join(META_JSON)
        .exists());
}

#[test]
fn test_summary_and_environment_are_optional() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");

    fake_batch(&root)
        .with_jobs([AlgorithmSpec::Ec {
            curve: NamedCurve::Secp256k1,
        }])
        .with_summary(true)
        .with_environment(true)
        .generate()
        .unwrap();

    let dir = root.join("asymmetric-encryption/EC-Curves/EC_secp256k1");
    let record = MetadataRecord::read(&dir).unwrap();
    let environment = record.environment.as_ref().unwrap();
    assert_eq!(environment.tool, FAKE_BACKEND_NAME);
    assert_eq!(environment.tool_version, "Fake 1.0");
    assert!(!environment.user.is_empty());
    assert!(!environment.host.is_empty());

    let summary = fs::read_to_string(dir.join(META_TXT)).unwrap();
    assert_eq!(summary, record.summary());
    assert!(summary.contains("Curve: secp256k1"));
    assert!(summary.contains("public_key.der"));

    let lines = log_lines(&root);
    assert_eq!(lines.len(), 2);
    assert_eq!(message(&lines[1]), COMPLETION_MARKER);
}

#[test]
fn test_run_writes_to_explicit_log_handle() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    let batch = fake_batch(&root).with_jobs([AlgorithmSpec::Aes { bits: 256 }]);

    let mut log = RunLog::from_writer(Vec::new(), "memory");
    batch.run(&mut log).unwrap();

    let text = String::from_utf8(log.into_inner()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(message(lines[0]).starts_with("Generated AES 256-bit key -> "));
    assert_eq!(message(lines[1]), COMPLETION_MARKER);
    assert!(!root.join("keygen.log").exists());
}

#[cfg(unix)]
#[test]
fn test_secret_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    fake_batch(&root)
        .with_jobs([AlgorithmSpec::Aes { bits: 128 }, AlgorithmSpec::Rsa { bits: 2048 }])
        .generate()
        .unwrap();

    let mode = |path: &str| fs::metadata(root.join(path)).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode("symmetric-encryption/AES/AES128/key.bin"), 0o600);
    assert_eq!(mode("asymmetric-encryption/RSA/RSA2048/private_key.pem"), 0o600);
    assert_eq!(mode("asymmetric-encryption/RSA/RSA2048/private_key.der"), 0o600);
}
