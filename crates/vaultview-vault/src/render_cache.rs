//! Render cache: bounded, TTL-expiring HTML keyed by note slug.
//!
//! Eviction is by insertion order (oldest first), not by access. Entries
//! past their TTL count as misses even when there is room to keep them.
//!
//! Every invalidation bumps a generation counter. A render records the
//! generation before it starts and stores its HTML with
//! [`RenderCache::insert_if_current`], so output built from notes that were
//! invalidated mid-render is returned to its caller but never cached.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vaultview_core::{PipelineMetrics, RenderCacheStats};

/// Characters of source text used in the fallback key
const CONTENT_KEY_PREFIX_CHARS: usize = 100;

/// Key for a render: the slug when known, otherwise a content-derived key
pub fn cache_key(slug: Option<&str>, source: &str) -> String {
    if let Some(slug) = slug {
        return slug.to_string();
    }
    let prefix: String = source.chars().take(CONTENT_KEY_PREFIX_CHARS).collect();
    let digest = Sha256::digest(source.as_bytes());
    let hash: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("content:{}:{}", prefix, hash)
}

#[derive(Debug)]
struct CacheEntry {
    html: Arc<str>,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, front is oldest
    order: VecDeque<String>,
    generation: u64,
}

impl Inner {
    fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }
}

pub struct RenderCache {
    inner: Mutex<Inner>,
    max_entries: usize,
    ttl: Duration,
    metrics: PipelineMetrics,
}

impl RenderCache {
    pub fn new(max_entries: usize, ttl: Duration, metrics: PipelineMetrics) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: max_entries.max(1),
            ttl,
            metrics,
        }
    }

    /// Cached HTML for `key` if present and younger than the TTL
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        let mut inner = self.inner.lock();

        let fresh = match inner.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => {
                Some(Arc::clone(&entry.html))
            }
            Some(_) => None,
            None => {
                self.metrics.render_misses.increment();
                return None;
            }
        };

        match fresh {
            Some(html) => {
                self.metrics.render_hits.increment();
                Some(html)
            }
            None => {
                inner.remove(key);
                self.metrics.render_expired.increment();
                self.metrics.render_misses.increment();
                log::trace!("Render cache entry expired: {}", key);
                None
            }
        }
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Store HTML, evicting the oldest entries while at capacity.
    ///
    /// Re-inserting a key replaces it and moves it to the back of the queue.
    pub fn insert(&self, key: impl Into<String>, html: impl Into<Arc<str>>) {
        let mut inner = self.inner.lock();
        self.store(&mut inner, key.into(), html.into());
    }

    /// Store HTML only if nothing was invalidated since `generation` was read.
    ///
    /// Returns whether the entry was stored.
    pub fn insert_if_current(
        &self,
        key: impl Into<String>,
        html: impl Into<Arc<str>>,
        generation: u64,
    ) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        self.store(&mut inner, key.into(), html.into());
        true
    }

    fn store(&self, inner: &mut Inner, key: String, html: Arc<str>) {
        inner.remove(&key);
        while inner.entries.len() >= self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            self.metrics.render_evictions.increment();
            log::debug!("Render cache evicted {}", oldest);
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                html,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop one entry
    pub fn invalidate(&self, key: &str) {
        let mut inner = self.inner.lock();
        inner.remove(key);
        inner.generation += 1;
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        inner.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RenderCacheStats {
        RenderCacheStats {
            entries: self.len(),
            max_entries: self.max_entries,
            ttl_ms: self.ttl.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max: usize, ttl: Duration) -> RenderCache {
        RenderCache::new(max, ttl, PipelineMetrics::new())
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = cache(10, Duration::from_secs(60));
        assert!(cache.get("a").is_none());
        cache.insert("a", "<p>a</p>");
        assert_eq!(cache.get("a").as_deref(), Some("<p>a</p>"));
        assert_eq!(cache.metrics.render_hits.value(), 1);
        assert_eq!(cache.metrics.render_misses.value(), 1);
    }

    #[test]
    fn test_bound_evicts_oldest_inserted() {
        let cache = cache(3, Duration::from_secs(60));
        for slug in ["n0", "n1", "n2", "n3"] {
            cache.insert(slug, slug);
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get("n0").is_none());
        for slug in ["n1", "n2", "n3"] {
            assert!(cache.get(slug).is_some(), "{} should remain", slug);
        }
        assert_eq!(cache.metrics.render_evictions.value(), 1);
    }

    #[test]
    fn test_access_does_not_refresh_order() {
        let cache = cache(2, Duration::from_secs(60));
        cache.insert("a", "a");
        cache.insert("b", "b");
        assert!(cache.get("a").is_some());
        cache.insert("c", "c");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_reinsert_moves_to_back() {
        let cache = cache(2, Duration::from_secs(60));
        cache.insert("a", "a1");
        cache.insert("b", "b");
        cache.insert("a", "a2");
        cache.insert("c", "c");
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").as_deref(), Some("a2"));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = cache(10, Duration::from_millis(20));
        cache.insert("a", "a");
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.metrics.render_expired.value(), 1);
    }

    #[test]
    fn test_invalidation() {
        let cache = cache(10, Duration::from_secs(60));
        cache.insert("a", "a");
        cache.insert("b", "b");
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());

        cache.invalidate_all();
        cache.invalidate_all();
        assert!(cache.is_empty());
        cache.invalidate("missing");
    }

    #[test]
    fn test_insert_after_invalidation_is_dropped() {
        let cache = cache(10, Duration::from_secs(60));
        let before = cache.generation();

        cache.invalidate_all();
        assert!(!cache.insert_if_current("a", "stale", before));
        assert!(cache.get("a").is_none());

        let current = cache.generation();
        assert!(cache.insert_if_current("a", "fresh", current));
        assert_eq!(cache.get("a").as_deref(), Some("fresh"));

        cache.invalidate("other");
        assert!(!cache.insert_if_current("b", "stale", current));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(Some("Notes/Foo"), "ignored"), "Notes/Foo");

        let shared = "x".repeat(150);
        let a = cache_key(None, &format!("{}A", shared));
        let b = cache_key(None, &format!("{}B", shared));
        assert!(a.starts_with(&format!("content:{}:", "x".repeat(100))));
        assert_ne!(a, b);
        assert_eq!(a, cache_key(None, &format!("{}A", shared)));
        assert_eq!(a.len(), "content:".len() + 100 + 1 + 16);
    }
}
