//! CLI subcommands, each a thin call into [`VaultManager`]

use crate::output::CommandResponse;
use anyhow::{Context, bail};
use clap::Subcommand;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Instant;
use vaultview_vault::VaultManager;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every note (slug, title, path, last modified)
    Notes,
    /// Print the folder tree
    Tree,
    /// Show one note with its front-matter and body
    Show { slug: String },
    /// Render a note, or a markdown file with --file, to HTML
    Render {
        slug: Option<String>,
        #[arg(long, conflicts_with = "slug")]
        file: Option<PathBuf>,
    },
    /// Table of contents of a note
    Headings { slug: String },
    /// Case-insensitive search over titles and bodies
    Search { query: String },
    /// Pull from git and rebuild all caches
    Sync,
    /// Cache statistics and last sync time
    Stats,
}

impl Command {
    pub fn operation(&self) -> &'static str {
        match self {
            Command::Notes => "notes",
            Command::Tree => "tree",
            Command::Show { .. } => "show",
            Command::Render { .. } => "render",
            Command::Headings { .. } => "headings",
            Command::Search { .. } => "search",
            Command::Sync => "sync",
            Command::Stats => "stats",
        }
    }
}

fn not_found(operation: &'static str, slug: &str) -> CommandResponse {
    CommandResponse::failed(operation, Value::Null, format!("Note not found: {}", slug))
}

/// Run one command against the manager
pub async fn execute(manager: &VaultManager, command: &Command) -> anyhow::Result<CommandResponse> {
    let started = Instant::now();
    let operation = command.operation();

    let response = match command {
        Command::Notes => {
            let notes = manager.note_summaries().await?;
            let count = notes.len();
            CommandResponse::ok(operation, serde_json::to_value(notes)?).with_count(count)
        }

        Command::Tree => {
            let tree = manager.get_file_tree().await?;
            CommandResponse::ok(operation, serde_json::to_value(tree)?)
        }

        Command::Show { slug } => match manager.get_note(slug).await? {
            Some(note) => CommandResponse::ok(operation, serde_json::to_value(note)?),
            None => not_found(operation, slug),
        },

        Command::Render { slug, file } => match (slug, file) {
            (Some(slug), _) => match manager.get_note(slug).await? {
                Some(note) => {
                    let html = manager.render(&note.content, Some(note.slug.as_str())).await?;
                    CommandResponse::ok(operation, Value::String(html.to_string()))
                }
                None => not_found(operation, slug),
            },
            (None, Some(path)) => {
                let markdown = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Cannot read {}", path.display()))?;
                let html = manager.render(&markdown, None).await?;
                CommandResponse::ok(operation, Value::String(html.to_string()))
            }
            (None, None) => bail!("render needs a note slug or --file"),
        },

        Command::Headings { slug } => match manager.get_note(slug).await? {
            Some(note) => {
                let headings = manager.extract_headings(&note.content);
                let count = headings.len();
                CommandResponse::ok(operation, serde_json::to_value(headings)?).with_count(count)
            }
            None => not_found(operation, slug),
        },

        Command::Search { query } => {
            let hits: Vec<_> = manager
                .search_notes(query)
                .await?
                .iter()
                .map(|note| note.summary())
                .collect();
            let count = hits.len();
            CommandResponse::ok(operation, serde_json::to_value(hits)?).with_count(count)
        }

        Command::Sync => {
            let result = manager.run_sync().await;
            let mut response = CommandResponse::ok(operation, serde_json::to_value(&result)?);
            if let Some(error) = &result.error {
                response.success = false;
                response.warnings.push(error.clone());
            }
            response
        }

        Command::Stats => {
            let stats = manager.get_cache_stats();
            let last_sync = manager.last_sync().await;
            CommandResponse::ok(
                operation,
                json!({
                    "cache": stats,
                    "lastSync": last_sync,
                    "syncing": manager.is_syncing(),
                }),
            )
        }
    };

    Ok(response.with_took_ms(started.elapsed().as_millis() as u64))
}
