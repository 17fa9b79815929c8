//! Tests for configuration defaults, validation and command-line overrides

use clap::Parser;
use keybatch::cli::{Cli, Commands};
use keybatch::config::{OPENSSL_ENV, OUTPUT_DIR_ENV, PASSWORD_ENV};
use keybatch::layout::prepare_output_root;
use keybatch::{BackendKind, BatchError, FailurePolicy, GeneratorConfig};
use keybatch_key::Family;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn config_from(vars: &[(&str, &str)]) -> GeneratorConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    GeneratorConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn test_defaults_without_environment() {
    let config = config_from(&[]);
    assert_eq!(config.output_root, PathBuf::from("keys"));
    assert_eq!(config.password.expose_secret(), "password");
    assert_eq!(config.backend, BackendKind::Library);
    assert_eq!(config.openssl_bin, PathBuf::from("openssl"));
    assert_eq!(config.failure_policy, FailurePolicy::Abort);
    assert!(!config.write_summary);
    assert!(!config.record_environment);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_overrides() {
    let config = config_from(&[
        (PASSWORD_ENV, "s3cret"),
        (OUTPUT_DIR_ENV, "out/keys"),
        (OPENSSL_ENV, "/opt/openssl/bin/openssl"),
    ]);
    assert_eq!(config.password.expose_secret(), "s3cret");
    assert_eq!(config.output_root, PathBuf::from("out/keys"));
    assert_eq!(config.openssl_bin, PathBuf::from("/opt/openssl/bin/openssl"));
}

#[test]
fn test_password_is_redacted_in_debug_output() {
    let config = config_from(&[(PASSWORD_ENV, "hunter2")]);
    assert!(!format!("{config:?}").contains("hunter2"));
}

#[test]
fn test_validation_rejects_dangerous_values() {
    let empty_password = config_from(&[(PASSWORD_ENV, "")]);
    assert!(matches!(
        empty_password.validate(),
        Err(BatchError::InvalidConfig(_))
    ));

    for root in ["", "/", ".", "..", "keys/..", "../keys", "out/../../keys"] {
        let config = config_from(&[(OUTPUT_DIR_ENV, root)]);
        assert!(
            matches!(config.validate(), Err(BatchError::InvalidConfig(_))),
            "{root:?}"
        );
    }
}

#[test]
fn test_backend_selection() {
    let mut config = config_from(&[]);
    assert_eq!(config.backend().name(), keybatch_key::LIBRARY_BACKEND_NAME);
    config.backend = BackendKind::Openssl;
    assert_eq!(config.backend().name(), keybatch_key::CLI_BACKEND_NAME);
}

#[test]
fn test_bare_invocation_generates_with_defaults() {
    let cli = Cli::try_parse_from(["keybatch"]).unwrap();
    assert!(cli.command.is_none());

    let mut config = config_from(&[]);
    cli.generate.apply(&mut config);
    assert_eq!(config.output_root, PathBuf::from("keys"));
    assert_eq!(config.failure_policy, FailurePolicy::Abort);
}

#[test]
fn test_flags_override_environment() {
    let cli = Cli::try_parse_from([
        "keybatch",
        "generate",
        "--output-dir",
        "elsewhere",
        "--backend",
        "openssl",
        "--openssl-bin",
        "/usr/local/bin/openssl",
        "--keep-going",
        "--summary",
        "--with-environment",
    ])
    .unwrap();

    let Some(Commands::Generate(args)) = cli.command else {
        panic!("expected generate");
    };
    let mut config = config_from(&[(OUTPUT_DIR_ENV, "from-env")]);
    args.apply(&mut config);

    assert_eq!(config.output_root, PathBuf::from("elsewhere"));
    assert_eq!(config.backend, BackendKind::Openssl);
    assert_eq!(config.openssl_bin, PathBuf::from("/usr/local/bin/openssl"));
    assert_eq!(config.failure_policy, FailurePolicy::Continue);
    assert!(config.write_summary);
    assert!(config.record_environment);
}

#[test]
fn test_top_level_flags_and_verify_subcommand() {
    let cli = Cli::try_parse_from(["keybatch", "-k", "-o", "tree"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.generate.keep_going);
    assert_eq!(cli.generate.output_dir.as_deref(), Some(Path::new("tree")));

    let cli = Cli::try_parse_from(["keybatch", "verify", "--output-dir", "tree"]).unwrap();
    let Some(Commands::Verify(args)) = cli.command else {
        panic!("expected verify");
    };
    assert_eq!(args.output_dir, Some(PathBuf::from("tree")));

    assert!(Cli::try_parse_from(["keybatch", "--backend", "gpg"]).is_err());
}

#[test]
fn test_prepare_output_root_creates_family_skeleton() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");

    prepare_output_root(&root).unwrap();
    for family in Family::ALL {
        assert!(root.join(family.relative_dir()).is_dir());
    }
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 2);
}

#[test]
fn test_prepare_output_root_refuses_parent_components() {
    let temp = tempfile::tempdir().unwrap();
    let keep = temp.path().join("keep.txt");
    std::fs::write(&keep, b"outside the run").unwrap();
    let root = temp.path().join("keys").join("..");

    assert!(matches!(
        prepare_output_root(&root),
        Err(BatchError::InvalidConfig(_))
    ));
    assert!(keep.is_file());
}

#[test]
fn test_prepare_output_root_refuses_regular_file() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("keys");
    std::fs::write(&root, b"not a directory").unwrap();

    assert!(matches!(
        prepare_output_root(&root),
        Err(BatchError::InvalidConfig(_))
    ));
    assert!(root.is_file());
}
