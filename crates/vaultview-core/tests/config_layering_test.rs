//! Config file, profile and validation working together

use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use vaultview_core::prelude::*;

#[test]
fn test_toml_file_then_profile() {
    let dir = TempDir::new().unwrap();
    let vault = dir.path().join("vault");
    fs::create_dir(&vault).unwrap();

    let config_path = dir.path().join("vaultview.toml");
    fs::write(
        &config_path,
        format!(
            "vault_path = {:?}\nrender_cache_max_entries = 7\n\n[git]\nbranch = \"trunk\"\ntimeout_secs = 15\n",
            vault.display().to_string()
        ),
    )
    .unwrap();

    let mut config = ViewerConfig::load(Some(config_path.as_path())).unwrap();
    assert_eq!(config.vault_path, vault);
    assert_eq!(config.render_cache_max_entries, 7);
    assert_eq!(config.git.branch, "trunk");
    assert_eq!(config.git.remote, "origin");
    assert_eq!(config.git.timeout(), Duration::from_secs(15));
    config.validate().unwrap();

    ConfigProfile::LowMemory.apply(&mut config);
    assert_eq!(config.render_cache_max_entries, 20);
    assert_eq!(config.vault_path, vault);
    assert_eq!(config.git.branch, "trunk");
    config.validate().unwrap();
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = ViewerConfig::load(Some(dir.path().join("absent.yaml").as_path()));
    assert!(matches!(result, Err(Error::ConfigError { .. })));
}

#[test]
fn test_validator_rooted_at_configured_vault() {
    let dir = TempDir::new().unwrap();
    let config = ViewerConfig::for_vault(dir.path());
    let validator = SlugValidator::new(&config.vault_path);

    let (slug, path) = validator.note_path("Daily/2025-01-01").unwrap();
    assert_eq!(slug, "Daily/2025-01-01");
    assert_eq!(path, dir.path().join("Daily/2025-01-01.md"));
    assert!(validator.note_path("Daily/../../etc").is_err());
}
