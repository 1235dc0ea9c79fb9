//! Configuration types for the vault viewer.
//!
//! Values are layered: built-in defaults, then an optional YAML/TOML file,
//! then `VAULTVIEW_*` environment variables (`__` separates nested keys,
//! e.g. `VAULTVIEW_GIT__BRANCH=trunk`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Git collaborator settings used by the sync orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote to fetch and pull from
    pub remote: String,
    /// Branch to pull
    pub branch: String,
    /// Explicit repository URL; falls back to the remote's configured URL
    pub repo_url: Option<String>,
    /// Username for authenticated HTTPS remotes
    pub username: Option<String>,
    /// Access token for authenticated HTTPS remotes
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Upper bound for every git invocation
    pub timeout_secs: u64,
    /// Extra fetch attempts after the first failure
    pub fetch_retries: u32,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            repo_url: None,
            username: None,
            token: None,
            timeout_secs: 60,
            fetch_retries: 2,
        }
    }
}

impl GitConfig {
    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fill unset credentials from `GIT_USERNAME`, `GIT_TOKEN` and `GIT_REPO_URL`.
    pub fn apply_env_credentials(&mut self) {
        if self.username.is_none() {
            self.username = std::env::var("GIT_USERNAME").ok().filter(|v| !v.is_empty());
        }
        if self.token.is_none() {
            self.token = std::env::var("GIT_TOKEN").ok().filter(|v| !v.is_empty());
        }
        if self.repo_url.is_none() {
            self.repo_url = std::env::var("GIT_REPO_URL").ok().filter(|v| !v.is_empty());
        }
    }
}

/// Global viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Root of the vault (a git work tree of markdown files)
    pub vault_path: PathBuf,
    /// Configuration profile name
    pub profile: String,
    pub log_level: String,

    // Render cache
    pub render_cache_max_entries: usize,
    pub render_cache_ttl_secs: u64,

    // Scanner
    pub scan_concurrency: usize,
    pub max_file_size: u64,

    pub git: GitConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            vault_path: PathBuf::from("./vault"),
            profile: "default".to_string(),
            log_level: "INFO".to_string(),
            render_cache_max_entries: 100,
            render_cache_ttl_secs: 300,
            scan_concurrency: 16,
            max_file_size: 10 * 1024 * 1024, // 10MB
            git: GitConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Create new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default configuration rooted at `vault_path`
    pub fn for_vault(vault_path: impl Into<PathBuf>) -> Self {
        Self {
            vault_path: vault_path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from an optional file plus `VAULTVIEW_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VAULTVIEW")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: ViewerConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;

        loaded.git.apply_env_credentials();
        loaded.expand_vault_path()?;
        Ok(loaded)
    }

    /// Expand `~` and environment variables in the vault path.
    pub fn expand_vault_path(&mut self) -> Result<()> {
        let raw = self.vault_path.to_string_lossy().to_string();
        let expanded = shellexpand::full(&raw)
            .map_err(|e| Error::config_error(format!("Cannot expand vault path: {}", e)))?;
        self.vault_path = PathBuf::from(expanded.as_ref());
        Ok(())
    }

    /// Render-cache time-to-live
    pub fn render_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.render_cache_ttl_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.vault_path.as_os_str().is_empty() {
            return Err(Error::config_error("Vault path cannot be empty"));
        }

        if !self.vault_path.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                self.vault_path.display()
            )));
        }

        if self.render_cache_max_entries == 0 {
            return Err(Error::config_error(
                "render_cache_max_entries must be at least 1",
            ));
        }

        if self.scan_concurrency == 0 {
            return Err(Error::config_error("scan_concurrency must be at least 1"));
        }

        if self.git.timeout_secs == 0 {
            return Err(Error::config_error("git.timeout_secs must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::new();
        assert_eq!(config.render_cache_max_entries, 100);
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.branch, "main");
        assert_eq!(config.git.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        let temp = TempDir::new().unwrap();
        let config = ViewerConfig::for_vault(temp.path());
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.render_cache_max_entries = 0;
        assert!(bad.validate().is_err());

        let missing = ViewerConfig::for_vault(temp.path().join("missing"));
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("vaultview.yaml");
        std::fs::write(
            &file,
            "vault_path: /srv/vault\nrender_cache_max_entries: 7\ngit:\n  branch: trunk\n",
        )
        .unwrap();

        let config = ViewerConfig::load(Some(file.as_path())).unwrap();
        assert_eq!(config.vault_path, PathBuf::from("/srv/vault"));
        assert_eq!(config.render_cache_max_entries, 7);
        assert_eq!(config.git.branch, "trunk");
        // untouched fields keep their defaults
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.render_cache_ttl_secs, 300);
    }

    #[test]
    fn test_token_not_serialized() {
        let mut config = ViewerConfig::new();
        config.git.token = Some("secret-token".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-token"));
    }
}
