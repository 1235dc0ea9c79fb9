//! Vault manager: the one object the HTTP layer and the CLI talk to.
//!
//! Owns the scanner, both caches, the sidebar bundle and the sync
//! orchestrator. Constructed once at startup and passed by handle.

use crate::git::{CommandGitClient, GitClient};
use crate::notes_cache::{NotesCache, NotesSnapshot};
use crate::render_cache::{RenderCache, cache_key};
use crate::scanner::{VaultScanner, task_failed};
use crate::sync::{SyncOrchestrator, SyncTarget};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use vaultview_core::prelude::*;
use vaultview_parser::{extract_headings, render_markdown};

/// Tree plus note listing, pre-fetched for every page's navigation
#[derive(Debug, Clone, Serialize)]
pub struct SidebarBundle {
    pub tree: Vec<FileTreeItem>,
    pub notes: Vec<NoteSummary>,
}

/// Everything a sync rebuilds
struct VaultCaches {
    scanner: Arc<VaultScanner>,
    notes: NotesCache,
    render: RenderCache,
    sidebar: RwLock<Option<Arc<SidebarBundle>>>,
}

impl VaultCaches {
    async fn build_sidebar(&self, snapshot: &NotesSnapshot) -> Result<Arc<SidebarBundle>> {
        let tree = self.scanner.tree().await?;
        let notes = snapshot.notes().iter().map(Note::summary).collect();
        let bundle = Arc::new(SidebarBundle { tree, notes });
        *self.sidebar.write() = Some(Arc::clone(&bundle));
        Ok(bundle)
    }

    fn invalidate(&self) {
        self.notes.invalidate();
        self.render.invalidate_all();
        self.sidebar.write().take();
    }
}

#[async_trait]
impl SyncTarget for VaultCaches {
    async fn rebuild_caches(&self) -> Result<usize> {
        self.notes.invalidate();
        self.render.invalidate_all();

        let snapshot = self.notes.refresh().await?;
        // Derived from the complete snapshot, never from a partial one
        let keys = snapshot.link_index().len();
        log::debug!("Link index rebuilt with {} keys", keys);

        // The previous bundle keeps serving until this one replaces it
        self.build_sidebar(&snapshot).await?;
        Ok(snapshot.len())
    }
}

pub struct VaultManager {
    config: ViewerConfig,
    validator: SlugValidator,
    caches: VaultCaches,
    sync: SyncOrchestrator,
    metrics: PipelineMetrics,
}

impl VaultManager {
    /// Manager whose sync shells out to `git` in the vault directory
    pub fn new(config: ViewerConfig) -> Self {
        let git = Arc::new(CommandGitClient::new(config.vault_path.clone()));
        Self::with_git_client(config, git)
    }

    pub fn with_git_client(config: ViewerConfig, git: Arc<dyn GitClient>) -> Self {
        let metrics = PipelineMetrics::new();
        let scanner = Arc::new(VaultScanner::new(&config, metrics.clone()));

        let caches = VaultCaches {
            notes: NotesCache::new(Arc::clone(&scanner)),
            render: RenderCache::new(
                config.render_cache_max_entries,
                config.render_cache_ttl(),
                metrics.clone(),
            ),
            sidebar: RwLock::new(None),
            scanner,
        };

        Self {
            validator: SlugValidator::new(config.vault_path.clone()),
            sync: SyncOrchestrator::new(git, config.git.clone(), metrics.clone()),
            caches,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// All notes, scanning on first use
    pub async fn get_all_notes(&self) -> Result<Arc<NotesSnapshot>> {
        self.caches.notes.get_all().await
    }

    /// Listing without note bodies
    pub async fn note_summaries(&self) -> Result<Vec<NoteSummary>> {
        let snapshot = self.get_all_notes().await?;
        Ok(snapshot.notes().iter().map(Note::summary).collect())
    }

    /// Fresh directory tree, read from disk on every call
    pub async fn get_file_tree(&self) -> Result<Vec<FileTreeItem>> {
        self.caches.scanner.tree().await
    }

    /// Look up one note. Invalid slugs are errors; a missing note is `None`.
    #[instrument(skip(self), name = "vault_get_note")]
    pub async fn get_note(&self, slug: &str) -> Result<Option<Note>> {
        let (slug, path) = self.validator.note_path(slug)?;

        if let Some(snapshot) = self.caches.notes.current()
            && let Some(note) = snapshot.get(&slug)
        {
            return Ok(Some(note.clone()));
        }

        Ok(self.caches.scanner.read_note(&slug, &path).await)
    }

    /// Case-insensitive substring match over title and content, in scan order
    pub async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.get_all_notes().await?;
        Ok(snapshot
            .notes()
            .iter()
            .filter(|note| note.matches_query(&query))
            .cloned()
            .collect())
    }

    /// Render markdown to HTML through the render cache.
    ///
    /// Wikilinks resolve against the current notes snapshot. A failed render
    /// is returned as an error and leaves the cache untouched.
    #[instrument(skip(self, markdown), fields(len = markdown.len()), name = "vault_render")]
    pub async fn render(&self, markdown: &str, slug: Option<&str>) -> Result<Arc<str>> {
        let key = cache_key(slug, markdown);
        if let Some(html) = self.caches.render.get(&key) {
            return Ok(html);
        }

        let _timer = self.metrics.render_ms.timer();
        // Read before the snapshot: an invalidation after this point makes the result uncacheable
        let generation = self.caches.render.generation();
        let snapshot = self.get_all_notes().await?;
        let source = markdown.to_string();

        let rendered = tokio::task::spawn_blocking(move || {
            render_markdown(&source, snapshot.link_index())
        })
        .await
        .map_err(|e| task_failed("render", e))
        .and_then(|result| result);

        match rendered {
            Ok(html) => {
                let html: Arc<str> = html.into();
                if !self.caches.render.insert_if_current(key, Arc::clone(&html), generation) {
                    log::debug!("Caches invalidated during render, result not cached");
                }
                Ok(html)
            }
            Err(e) => {
                self.metrics.render_failures.increment();
                log::warn!("Render failed for {}: {}", slug.unwrap_or("<inline>"), e);
                Err(e)
            }
        }
    }

    /// Table-of-contents headings; pure and uncached
    pub fn extract_headings(&self, markdown: &str) -> Vec<Heading> {
        extract_headings(markdown)
    }

    /// Populate the notes snapshot, link index and sidebar bundle
    #[instrument(skip(self), name = "vault_warm_caches")]
    pub async fn warm_caches(&self) -> Result<()> {
        let snapshot = self.get_all_notes().await?;
        let keys = snapshot.link_index().len();
        self.caches.build_sidebar(&snapshot).await?;
        log::info!(
            "Caches warm: {} notes, {} link keys",
            snapshot.len(),
            keys
        );
        Ok(())
    }

    /// Drop every cache. Safe to call repeatedly.
    pub fn invalidate_caches(&self) {
        self.caches.invalidate();
        log::debug!("All caches invalidated");
    }

    /// Drop the cached render of one note
    pub fn invalidate_render(&self, slug: &str) {
        self.caches.render.invalidate(slug);
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        CacheStats {
            notes: self.caches.notes.stats(),
            render: self.caches.render.stats(),
            link_index_keys: self
                .caches
                .notes
                .current()
                .and_then(|snapshot| snapshot.link_index_keys()),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Sidebar bundle, built on first request and after every sync
    pub async fn get_sidebar(&self) -> Result<Arc<SidebarBundle>> {
        if let Some(bundle) = self.caches.sidebar.read().clone() {
            return Ok(bundle);
        }
        let snapshot = self.get_all_notes().await?;
        self.caches.build_sidebar(&snapshot).await
    }

    /// Pull from git and rebuild every cache; never fails, see [`SyncResult`]
    pub async fn run_sync(&self) -> SyncResult {
        self.sync.run(&self.caches).await
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_syncing()
    }

    /// Date of the newest commit in the vault
    pub async fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.sync.last_sync().await
    }

    /// Create the vault directory and clone the configured repository into it
    pub async fn ensure_vault(&self) -> Result<()> {
        self.sync.ensure_vault(&self.config.vault_path).await
    }
}
