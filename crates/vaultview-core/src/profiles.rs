//! Pre-configured profiles for different deployment scenarios
//!
//! - Development: verbose logging, short render-cache TTL so edits show up quickly
//! - Production: larger render cache, longer TTL, info logging
//! - LowMemory: small render cache for constrained hosts

use crate::config::ViewerConfig;
use std::str::FromStr;

/// Profile selector for pre-configured deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProfile {
    /// Development: debug logging, 30s render-cache TTL
    Development,
    /// Production: 500 cached renders, 1 hour TTL
    Production,
    /// LowMemory: 20 cached renders, low scan concurrency
    LowMemory,
}

impl ConfigProfile {
    /// Create a ViewerConfig from this profile
    pub fn create_config(self) -> ViewerConfig {
        let mut config = ViewerConfig::new();
        self.apply(&mut config);
        config
    }

    /// Overwrite the tunables of an existing config with this profile's values
    pub fn apply(self, config: &mut ViewerConfig) {
        match self {
            Self::Development => {
                config.log_level = "DEBUG".to_string();
                config.render_cache_max_entries = 100;
                config.render_cache_ttl_secs = 30;
                config.scan_concurrency = 16;
            }

            Self::Production => {
                config.log_level = "INFO".to_string();
                config.render_cache_max_entries = 500;
                config.render_cache_ttl_secs = 3600;
                config.scan_concurrency = 32;
                config.git.fetch_retries = 3;
            }

            Self::LowMemory => {
                config.log_level = "WARN".to_string();
                config.render_cache_max_entries = 20;
                config.render_cache_ttl_secs = 300;
                config.scan_concurrency = 4;
                config.max_file_size = 2 * 1024 * 1024;
            }
        }

        config.profile = self.name().to_string();
    }

    /// Profile name as used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::LowMemory => "low-memory",
        }
    }

    /// Get recommendation for use case
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Development => "Local editing and debugging",
            Self::Production => "Public deployments with steady traffic",
            Self::LowMemory => "Small VPS or container with tight memory limits",
        }
    }
}

impl FromStr for ConfigProfile {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "low-memory" | "lowmemory" | "minimal" => Ok(Self::LowMemory),
            other => Err(crate::Error::config_error(format!(
                "Unknown profile '{}'. Valid options: development, production, low-memory",
                other
            ))),
        }
    }
}
