//! Integration tests for layered configuration loading

use super::test_utils::ENV_MUTEX;
use dmanifest::config::{global_config_path, ConfigLoader, WORKSPACE_CONFIG_NAME};
use dmanifest::tree::hasher::DigestAlgorithm;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Run `f` with XDG_CONFIG_HOME pointed at `config_home`, restoring it after
fn with_config_home<T>(config_home: &Path, f: impl FnOnce() -> T) -> T {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", config_home);
    let result = f();
    match original {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    result
}

#[test]
fn test_defaults_without_files() {
    let xdg = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let config = with_config_home(xdg.path(), || ConfigLoader::load(project.path()).unwrap());
    assert_eq!(config.manifest.file_name, ".dmanifest");
    assert_eq!(config.manifest.digest, DigestAlgorithm::Sha256);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_project_file_overrides_global() {
    let xdg = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let (global, config) = with_config_home(xdg.path(), || {
        let global = global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[manifest]\ntype_tag = \"global-tag\"\ndigest = \"blake3\"\n",
        )
        .unwrap();
        fs::write(
            project.path().join(WORKSPACE_CONFIG_NAME),
            "[manifest]\ntype_tag = \"project-tag\"\n",
        )
        .unwrap();
        (global, ConfigLoader::load(project.path()).unwrap())
    });

    assert!(global.starts_with(xdg.path()));
    assert_eq!(config.manifest.type_tag, "project-tag");
    assert_eq!(config.manifest.digest, DigestAlgorithm::Blake3);
}

#[test]
fn test_environment_overrides_files() {
    let xdg = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join(WORKSPACE_CONFIG_NAME),
        "[transfer]\nrequest_timeout_secs = 60\n",
    )
    .unwrap();

    let config = with_config_home(xdg.path(), || {
        std::env::set_var("DMANIFEST__TRANSFER__REQUEST_TIMEOUT_SECS", "5");
        let loaded = ConfigLoader::load(project.path());
        std::env::remove_var("DMANIFEST__TRANSFER__REQUEST_TIMEOUT_SECS");
        loaded.unwrap()
    });

    assert_eq!(config.transfer.request_timeout_secs, 5);
}

#[test]
fn test_explicit_file_must_exist() {
    let temp = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp.path().join("missing.toml")).is_err());
}

#[test]
fn test_invalid_values_rejected_by_validation() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    fs::write(&path, "[manifest]\nfile_name = \"a/b\"\n").unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert!(config.ensure_valid().is_err());
}
