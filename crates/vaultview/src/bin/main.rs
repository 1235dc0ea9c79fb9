//! vaultview CLI

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use vaultview::{Command, LogFormat, OutputFormat, execute, init_logging};
use vaultview_core::prelude::*;
use vaultview_vault::VaultManager;

/// vaultview - browse, render and sync a git-backed markdown vault
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the vault directory
    #[arg(short, long, env = "VAULT_PATH")]
    vault: Option<PathBuf>,

    /// Configuration file (YAML or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, low-memory)
    #[arg(short, long)]
    profile: Option<String>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    /// Output format (json, human, text)
    #[arg(short, long, default_value = "json")]
    output: String,

    /// Create the vault directory and clone the configured repository if needed
    #[arg(long, action = clap::ArgAction::SetTrue)]
    init: bool,

    #[command(subcommand)]
    command: Command,
}

fn load_config(args: &Args) -> anyhow::Result<ViewerConfig> {
    let mut config = ViewerConfig::load(args.config.as_deref())?;

    if let Some(profile) = &args.profile {
        ConfigProfile::from_str(profile)?.apply(&mut config);
    }

    if let Some(vault) = &args.vault {
        config.vault_path = vault.clone();
        config.expand_vault_path()?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let output_format = args
        .output
        .parse::<OutputFormat>()
        .map_err(anyhow::Error::msg)?;
    let config = load_config(&args).context("Failed to load configuration")?;

    init_logging(args.log_format, &config.log_level)?;
    log::info!("vaultview v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Vault: {} | Profile: {}",
        config.vault_path.display(),
        config.profile
    );

    let manager = VaultManager::new(config);

    if args.init
        && let Err(e) = manager.ensure_vault().await
    {
        log::warn!("Vault initialization failed: {}", e);
    }

    manager
        .config()
        .validate()
        .context("Invalid configuration")?;

    // A cold cache is still usable; every read scans on demand
    if let Err(e) = manager.warm_caches().await {
        log::warn!("Failed to warm caches: {}. Continuing with cold caches.", e);
    }

    let response = execute(&manager, &args.command).await?;
    print!("{}", response.render(output_format));
    if output_format != OutputFormat::Text {
        println!();
    }

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
