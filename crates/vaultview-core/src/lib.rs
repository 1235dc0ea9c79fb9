//! # vaultview core
//!
//! Data models, error types, configuration and input validation shared by the
//! parser, vault and binary crates.
//!
//! ## Core Modules
//!
//! - [`models`] - `Note`, `FileTreeItem`, `Heading`, cache statistics, sync results
//! - [`error`] - Error taxonomy and `Result` alias
//! - [`config`] - `ViewerConfig` layered from defaults, file and environment
//! - [`profiles`] - Tuned configurations for common deployments
//! - [`validation`] - Slug validation (path traversal and character allow-list)
//! - [`metrics`] - Lock-free counters and histograms
//! - [`resilience`] - Retry with exponential backoff
//!
//! ## Usage Examples
//!
//! ### Validating caller input
//!
//! ```
//! use vaultview_core::prelude::*;
//!
//! let validator = SlugValidator::new("/srv/vault");
//! assert_eq!(validator.validate("Timeline & Milestones").unwrap(), "Timeline & Milestones");
//! assert!(matches!(validator.validate("../etc/passwd"), Err(Error::PathTraversal)));
//! ```
//!
//! ### Configuration
//!
//! ```
//! use vaultview_core::prelude::*;
//!
//! let config = ConfigProfile::Production.create_config();
//! assert_eq!(config.render_cache_max_entries, 500);
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod profiles;
pub mod resilience;
pub mod validation;

pub use config::{GitConfig, ViewerConfig};
pub use error::{Error, Result};
pub use metrics::{Counter, Histogram, HistogramStats, MetricsSnapshot, PipelineMetrics};
pub use models::*;
pub use profiles::ConfigProfile;
pub use resilience::{RetryConfig, retry_with_backoff};
pub use validation::{MAX_SLUG_LEN, SlugValidator};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{GitConfig, ViewerConfig};
    pub use crate::error::{Error, Result};
    pub use crate::metrics::{MetricsSnapshot, PipelineMetrics};
    pub use crate::models::{
        CacheStats, FileTreeItem, FileType, Frontmatter, Heading, Note, NoteSummary,
        NotesCacheStats, RenderCacheStats, SyncResult,
    };
    pub use crate::profiles::ConfigProfile;
    pub use crate::validation::SlugValidator;
}
