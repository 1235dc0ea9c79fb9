//! # vaultview
//!
//! Command-line front end for a git-backed markdown vault. Every subcommand
//! is a single call into [`vaultview_vault::VaultManager`]; this crate only
//! adds argument parsing, config loading, logging and output formatting.
//!
//! ```text
//! vaultview --vault ~/notes notes
//! vaultview --vault ~/notes render "Projects/Roadmap" --output text
//! vaultview --config vaultview.yaml --profile production sync
//! ```

pub mod commands;
pub mod logging;
pub mod output;

pub use commands::{Command, execute};
pub use logging::{LogFormat, init_logging};
pub use output::{CommandResponse, OutputFormat, ResponseFormatter};
