//! Config file loading, error messages and layering.

use assert_fs::prelude::*;
use leafsync_core::{
    config::{self, ConfigFile},
    ConfigError,
};
use predicates::prelude::predicate;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_full_config_file() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str(
        "host: https://latex.example.org\n\
         email: me@example.com\n\
         password: secret\n\
         projects: [Thesis, 64a1f0c2]\n\
         tags: [papers]\n\
         downloads_path: /srv/papers\n\
         accept_invites: true\n\
         force_download: false\n\
         force_write_last_run: true\n",
    )
    .expect("write");

    let layer = config::load_at(file.path()).expect("load");
    let cfg = layer.resolve().expect("resolve");
    assert_eq!(cfg.host, "https://latex.example.org");
    assert_eq!(cfg.credentials.email, "me@example.com");
    assert_eq!(
        cfg.projects,
        Some(vec!["Thesis".to_string(), "64a1f0c2".to_string()])
    );
    assert_eq!(cfg.tags, Some(vec!["papers".to_string()]));
    assert_eq!(cfg.downloads_path, PathBuf::from("/srv/papers"));
    assert!(cfg.accept_invites);
    assert!(!cfg.force_download);
    assert!(cfg.force_write_last_run);
}

#[test]
fn empty_file_is_empty_layer() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("\n").expect("write");
    assert_eq!(config::load_at(file.path()).expect("load"), ConfigFile::default());
}

#[test]
fn unknown_key_is_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("emial: typo@example.com\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn missing_explicit_file_is_io_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
    dir.child("absent.yaml").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 2. Layering
// ---------------------------------------------------------------------------

#[test]
fn flags_override_file_values() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("email: file@example.com\npassword: p\ndownloads_path: /a\ntags: [x]\n")
        .expect("write");

    let flags = ConfigFile {
        downloads_path: Some(PathBuf::from("/b")),
        force_download: Some(true),
        ..ConfigFile::default()
    };
    let cfg = config::load_at(file.path())
        .expect("load")
        .merge(flags)
        .resolve()
        .expect("resolve");
    assert_eq!(cfg.downloads_path, PathBuf::from("/b"));
    assert_eq!(cfg.credentials.email, "file@example.com");
    assert_eq!(cfg.tags, Some(vec!["x".to_string()]));
    assert!(cfg.force_download);
}

#[test]
fn missing_password_after_merge_is_reported() {
    let layer = ConfigFile {
        email: Some("me@example.com".into()),
        downloads_path: Some(PathBuf::from("/a")),
        ..ConfigFile::default()
    };
    let err = layer.resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Missing { field: "password" }));
}
