//! Lock-free metrics for cache and pipeline observability
//!
//! - Counter: monotonically increasing atomic u64
//! - Histogram: bounded window of recent samples (milliseconds)
//! - HistogramTimer: RAII timer for automatic duration recording
//! - PipelineMetrics: the named counters and histograms the vault crate records

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Samples kept per histogram; older samples are dropped.
const HISTOGRAM_WINDOW: usize = 1024;

/// A lock-free counter metric (monotonically increasing)
#[derive(Debug, Clone)]
pub struct Counter {
    value: Arc<AtomicU64>,
    name: &'static str,
}

impl Counter {
    /// Create a new counter with the given name
    pub fn new(name: &'static str) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(0)),
            name,
        }
    }

    /// Increment counter by 1
    pub fn increment(&self) {
        self.add(1);
    }

    /// Add value to counter (saturating)
    pub fn add(&self, value: u64) {
        let mut current = self.value.load(Ordering::Relaxed);
        loop {
            let new_value = current.saturating_add(value);
            match self.value.compare_exchange_weak(
                current,
                new_value,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Get current value
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Get metric name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A histogram over a sliding window of recent samples
#[derive(Debug, Clone)]
pub struct Histogram {
    values: Arc<RwLock<VecDeque<f64>>>,
    total: Arc<AtomicU64>,
    name: &'static str,
}

impl Histogram {
    /// Create a new histogram
    pub fn new(name: &'static str) -> Self {
        Self {
            values: Arc::new(RwLock::new(VecDeque::with_capacity(64))),
            total: Arc::new(AtomicU64::new(0)),
            name,
        }
    }

    /// Record a value in the histogram
    pub fn record(&self, value: f64) {
        let mut v = self.values.write();
        if v.len() == HISTOGRAM_WINDOW {
            v.pop_front();
        }
        v.push_back(value);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a timer for automatic duration recording
    pub fn timer(&self) -> HistogramTimer {
        HistogramTimer {
            histogram: self.clone(),
            start: Instant::now(),
        }
    }

    /// Get statistics for the samples currently in the window
    pub fn stats(&self) -> HistogramStats {
        let v = self.values.read();
        let total = self.total.load(Ordering::Relaxed);
        if v.is_empty() {
            return HistogramStats {
                total,
                ..HistogramStats::default()
            };
        }

        let sum: f64 = v.iter().sum();
        let count = v.len();
        HistogramStats {
            total,
            count,
            mean: sum / count as f64,
            min: v.iter().copied().fold(f64::INFINITY, f64::min),
            max: v.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            last: v.back().copied().unwrap_or_default(),
        }
    }

    /// Get metric name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Statistics computed from histogram values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistogramStats {
    /// Samples ever recorded
    pub total: u64,
    /// Samples in the current window
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Most recent sample
    pub last: f64,
}

/// RAII timer that records elapsed milliseconds on drop
#[derive(Debug)]
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.histogram.record(duration_ms);
    }
}

/// Metrics recorded by the scanner, caches, renderer and sync orchestrator.
///
/// Cheap to clone; every clone shares the same atomics.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub render_hits: Counter,
    pub render_misses: Counter,
    pub render_evictions: Counter,
    pub render_expired: Counter,
    pub render_failures: Counter,
    pub scans: Counter,
    pub skipped_files: Counter,
    pub syncs_succeeded: Counter,
    pub syncs_failed: Counter,
    pub syncs_rejected: Counter,
    pub scan_ms: Histogram,
    pub render_ms: Histogram,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            render_hits: Counter::new("render_cache_hits"),
            render_misses: Counter::new("render_cache_misses"),
            render_evictions: Counter::new("render_cache_evictions"),
            render_expired: Counter::new("render_cache_expired"),
            render_failures: Counter::new("render_failures"),
            scans: Counter::new("vault_scans"),
            skipped_files: Counter::new("vault_skipped_files"),
            syncs_succeeded: Counter::new("syncs_succeeded"),
            syncs_failed: Counter::new("syncs_failed"),
            syncs_rejected: Counter::new("syncs_rejected"),
            scan_ms: Histogram::new("vault_scan_ms"),
            render_ms: Histogram::new("render_ms"),
        }
    }

    /// Point-in-time copy suitable for serialization
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            render_hits: self.render_hits.value(),
            render_misses: self.render_misses.value(),
            render_evictions: self.render_evictions.value(),
            render_expired: self.render_expired.value(),
            render_failures: self.render_failures.value(),
            scans: self.scans.value(),
            skipped_files: self.skipped_files.value(),
            syncs_succeeded: self.syncs_succeeded.value(),
            syncs_failed: self.syncs_failed.value(),
            syncs_rejected: self.syncs_rejected.value(),
            scan_ms: self.scan_ms.stats(),
            render_ms: self.render_ms.stats(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of [`PipelineMetrics`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub render_hits: u64,
    pub render_misses: u64,
    pub render_evictions: u64,
    pub render_expired: u64,
    pub render_failures: u64,
    pub scans: u64,
    pub skipped_files: u64,
    pub syncs_succeeded: u64,
    pub syncs_failed: u64,
    pub syncs_rejected: u64,
    pub scan_ms: HistogramStats,
    pub render_ms: HistogramStats,
}
