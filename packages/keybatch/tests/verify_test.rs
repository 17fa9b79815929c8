//! Tests for output tree verification

mod common;

use common::FakeBackend;
use keybatch::{verify_tree, BatchError, KeyBatch};
use keybatch_common::LoggingTransformer;
use std::fs;

#[test]
fn test_fresh_tree_verifies_clean() {
    LoggingTransformer::init_test();
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    KeyBatch::at(&root)
        .with_backend(FakeBackend::default())
        .generate()
        .unwrap();

    let report = verify_tree(&root).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.directories.len(), 13);
    assert_eq!(report.files_checked, 3 + 3 * 4 + 4 * 4 + 3 + 2 * 2);
}

#[test]
fn test_tampered_and_missing_files_are_reported() {
    LoggingTransformer::init_test();
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    KeyBatch::at(&root)
        .with_backend(FakeBackend::default())
        .generate()
        .unwrap();

    let tampered = root.join("asymmetric-encryption/RSA/RSA2048/public_key.pem");
    fs::write(&tampered, b"replaced").unwrap();
    let missing = root.join("asymmetric-encryption/EdDSA/ED25519/private_key.pem");
    fs::remove_file(&missing).unwrap();

    let report = verify_tree(&root).unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.problems.len(), 2);

    assert!(report.problems.iter().any(|problem| matches!(
        problem,
        BatchError::IntegrityMismatch { file, expected, actual }
            if file == &tampered && expected != actual
    )));
    assert!(report
        .problems
        .iter()
        .any(|problem| matches!(problem, BatchError::MissingFile(file) if file == &missing)));
}

#[test]
fn test_missing_root_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    assert!(verify_tree(&temp.path().join("absent")).is_err());
}
