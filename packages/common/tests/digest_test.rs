//! Tests for SHA-256 content digests

use keybatch_common::{sha256_file, sha256_hex, LoggingTransformer};
use std::io::Write;

#[test]
fn test_sha256_hex_known_vector() {
    LoggingTransformer::init_test();

    assert_eq!(
        sha256_hex(b"Hello, world!"),
        "315f5bdb76d078c43b8ac0064e4a0164612b1fce77c869345bfc94c75894edd3"
    );
}

#[test]
fn test_sha256_hex_empty_input() {
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_sha256_file_matches_in_memory_digest() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let contents = vec![0xA5u8; 100_000];
    file.write_all(&contents).unwrap();
    file.flush().unwrap();

    let from_disk = sha256_file(file.path()).unwrap();
    assert_eq!(from_disk, sha256_hex(&contents));
    assert_eq!(from_disk.len(), 64);
}

#[test]
fn test_sha256_file_missing_path_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = sha256_file(dir.path().join("absent.bin"));
    assert!(result.is_err());
}
