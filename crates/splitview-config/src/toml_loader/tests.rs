//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_splitview_config.toml"));
    assert!(matches!(result, Err(splitview_common::ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[popup]
inset_top = 72
gap = 4

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.popup.inset_top, 72);
    assert_eq!(config.popup.gap, 4);
    assert_eq!(config.logging.level, crate::schema::LogLevel::Debug);
    // Defaults preserved
    assert_eq!(config.popup.min_height, 100);
    assert_eq!(config.reconcile.bounds_debounce_ms, 100);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(splitview_common::ConfigError::ParseError(_))));
}

#[test]
fn load_config_with_invalid_values_keeps_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[popup]
gap = 500
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.popup.gap, 500);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("splitview").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.popup.inset_top, 40);
    assert!(config.persistence.enabled);
}

#[test]
fn default_config_path_is_reasonable() {
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("splitview"));
        assert!(path_str.ends_with("config.toml"));
    }
}
