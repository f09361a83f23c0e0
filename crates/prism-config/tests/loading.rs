//! Loading configuration files from disk.

use std::fs;
use std::path::PathBuf;

use prism_config::{ConfigError, ConfigOverrides, PrismConfig};
use tempfile::TempDir;

#[test]
fn loads_an_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prism.json");
    fs::write(
        &path,
        r#"{
  "root": "elements",
  "entrypoints": ["my-app.html", "my-app.js"],
  "exclude": ["bower_components"],
  "external_packages": true
}"#,
    )
    .unwrap();

    let config = PrismConfig::load(Some(&path), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.root, PathBuf::from("elements"));
    assert_eq!(config.entrypoints, ["my-app.html", "my-app.js"]);
    assert_eq!(config.exclude, ["bower_components"]);
    assert!(config.external_packages);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");

    let error = PrismConfig::load(Some(&path), &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(&error, ConfigError::NotFound(missing) if missing == &path));
    assert!(error.to_string().contains("nope.json"));
}

#[test]
fn malformed_json_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prism.json");
    fs::write(&path, "{ root: ").unwrap();

    let error = PrismConfig::load(Some(&path), &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(error, ConfigError::Load(_)));
}

#[test]
fn overrides_apply_on_top_of_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prism.json");
    fs::write(&path, r#"{"entrypoints": ["a.html"], "external_packages": true}"#).unwrap();

    let overrides = ConfigOverrides {
        entrypoints: vec!["b.html".to_string()],
        external_packages: Some(false),
        ..Default::default()
    };
    let config = PrismConfig::load(Some(&path), &overrides).unwrap();
    assert_eq!(config.entrypoints, ["b.html"]);
    assert!(!config.external_packages);
}
