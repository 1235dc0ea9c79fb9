//! Notes cache: the last scanned snapshot, swapped whole.
//!
//! Readers clone an `Arc<NotesSnapshot>` and never see a half-built one. A
//! scan is shared by every caller that arrives while it runs.

use crate::link_index::LinkIndex;
use crate::scanner::VaultScanner;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::instrument;
use vaultview_core::prelude::*;

/// An immutable, complete view of the vault at one scan
#[derive(Debug)]
pub struct NotesSnapshot {
    notes: Vec<Note>,
    by_slug: HashMap<String, usize>,
    scanned_at: Instant,
    link_index: OnceLock<LinkIndex>,
}

impl NotesSnapshot {
    pub fn new(notes: Vec<Note>) -> Self {
        let by_slug = notes
            .iter()
            .enumerate()
            .map(|(i, note)| (note.slug.clone(), i))
            .collect();
        Self {
            notes,
            by_slug,
            scanned_at: Instant::now(),
            link_index: OnceLock::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Note> {
        self.by_slug.get(slug).map(|&i| &self.notes[i])
    }

    pub fn age_ms(&self) -> u64 {
        self.scanned_at.elapsed().as_millis() as u64
    }

    /// Link index derived from exactly these notes, built on first use
    pub fn link_index(&self) -> &LinkIndex {
        self.link_index
            .get_or_init(|| LinkIndex::build(self.notes.iter()))
    }

    /// Key count if the index has been built
    pub fn link_index_keys(&self) -> Option<usize> {
        self.link_index.get().map(LinkIndex::len)
    }
}

/// Demand-populated holder of the current [`NotesSnapshot`]
pub struct NotesCache {
    scanner: Arc<VaultScanner>,
    current: RwLock<Option<Arc<NotesSnapshot>>>,
    /// Held for the duration of a scan; at most one runs at a time
    scan_lock: tokio::sync::Mutex<()>,
}

impl NotesCache {
    pub fn new(scanner: Arc<VaultScanner>) -> Self {
        Self {
            scanner,
            current: RwLock::new(None),
            scan_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current snapshot without scanning
    pub fn current(&self) -> Option<Arc<NotesSnapshot>> {
        self.current.read().clone()
    }

    /// Current snapshot, scanning first if the cache is empty
    #[instrument(skip(self), name = "notes_cache_get_all")]
    pub async fn get_all(&self) -> Result<Arc<NotesSnapshot>> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        let _guard = self.scan_lock.lock().await;
        // Whoever held the lock before us may have filled the cache
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        self.scan_and_install().await
    }

    /// Drop the snapshot and scan again; readers arriving meanwhile wait for
    /// the new snapshot instead of starting their own scan.
    #[instrument(skip(self), name = "notes_cache_refresh")]
    pub async fn refresh(&self) -> Result<Arc<NotesSnapshot>> {
        let _guard = self.scan_lock.lock().await;
        self.invalidate();
        self.scan_and_install().await
    }

    async fn scan_and_install(&self) -> Result<Arc<NotesSnapshot>> {
        let outcome = self.scanner.scan_all().await?;
        let snapshot = Arc::new(NotesSnapshot::new(outcome.notes));
        *self.current.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Clear the snapshot. Safe to call when already empty.
    pub fn invalidate(&self) {
        if self.current.write().take().is_some() {
            log::debug!("Notes cache invalidated");
        }
    }

    pub fn stats(&self) -> NotesCacheStats {
        match self.current() {
            Some(snapshot) => NotesCacheStats {
                count: snapshot.len(),
                age_ms: snapshot.age_ms(),
                is_populated: true,
            },
            None => NotesCacheStats {
                count: 0,
                age_ms: 0,
                is_populated: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vaultview_core::PipelineMetrics;

    fn cache(dir: &TempDir, metrics: &PipelineMetrics) -> Arc<NotesCache> {
        let scanner = VaultScanner::new(&ViewerConfig::for_vault(dir.path()), metrics.clone());
        Arc::new(NotesCache::new(Arc::new(scanner)))
    }

    #[tokio::test]
    async fn test_get_all_populates_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "A").unwrap();
        let metrics = PipelineMetrics::new();
        let cache = cache(&dir, &metrics);

        assert!(!cache.stats().is_populated);
        let first = cache.get_all().await.unwrap();
        let second = cache.get_all().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(metrics.scans.value(), 1);
        assert_eq!(cache.stats().count, 1);
        assert!(cache.stats().is_populated);
    }

    #[tokio::test]
    async fn test_no_staleness_refresh_without_invalidate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "A").unwrap();
        let cache = cache(&dir, &PipelineMetrics::new());

        assert_eq!(cache.get_all().await.unwrap().len(), 1);
        fs::write(dir.path().join("b.md"), "B").unwrap();
        assert_eq!(cache.get_all().await.unwrap().len(), 1);

        cache.invalidate();
        assert_eq!(cache.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir, &PipelineMetrics::new());
        cache.invalidate();
        cache.invalidate();
        assert!(!cache.stats().is_populated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_scan() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("n{}.md", i)), "x").unwrap();
        }
        let metrics = PipelineMetrics::new();
        let cache = cache(&dir, &metrics);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_all().await.map(|s| s.len()) })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 20);
        }
        assert_eq!(metrics.scans.value(), 1);
    }

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "A").unwrap();
        let cache = cache(&dir, &PipelineMetrics::new());

        let old = cache.get_all().await.unwrap();
        fs::remove_file(dir.path().join("a.md")).unwrap();
        let new = cache.refresh().await.unwrap();

        // A reader holding the old snapshot still sees it whole
        assert_eq!(old.len(), 1);
        assert!(old.get("a").is_some());
        assert_eq!(new.len(), 0);
    }

    #[test]
    fn test_snapshot_link_index_is_lazy() {
        let snapshot = NotesSnapshot::new(vec![crate::scanner::parse_note(
            "dir/Note",
            "body",
            chrono::Utc::now(),
        )]);
        assert_eq!(snapshot.link_index_keys(), None);
        assert_eq!(snapshot.link_index().get("note"), Some("dir/Note"));
        assert_eq!(snapshot.link_index_keys(), Some(2));
    }
}
