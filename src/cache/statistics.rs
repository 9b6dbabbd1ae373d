//! Lock-free cache statistics
//!
//! Counters are relaxed atomics padded to cache-line size so hot-path
//! recording never contends with snapshot readers.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use serde::{Deserialize, Serialize};

/// Atomic hit/miss and disk I/O counters
#[derive(Debug, Default)]
pub struct CacheStatistics {
    /// Opens served from a resident entry
    hits: CachePadded<AtomicU64>,
    /// Opens that required a load or create
    misses: CachePadded<AtomicU64>,
    /// Whole-object reads from the backing store
    disk_reads: CachePadded<AtomicU64>,
    /// Whole-object writes to the backing store
    disk_writes: CachePadded<AtomicU64>,
}

impl CacheStatistics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    #[inline(always)]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    #[inline(always)]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a whole-object read from the backing store
    #[inline(always)]
    pub fn record_disk_read(&self) {
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a whole-object write to the backing store
    #[inline(always)]
    pub fn record_disk_write(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Hit rate over all opens so far, 0.0 before the first open
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Snapshot the counters together with the store's size accounting
    pub fn snapshot(&self, current_size: u64, max_size: u64, entry_count: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
            disk_reads: self.disk_reads.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
            current_size,
            max_size,
            entry_count,
        }
    }
}

/// Point-in-time statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Opens served from a resident entry
    pub hits: u64,
    /// Opens that required a load or create
    pub misses: u64,
    /// hits / (hits + misses), 0.0 before the first open
    pub hit_rate: f64,
    /// Whole-object reads from the backing store
    pub disk_reads: u64,
    /// Whole-object writes to the backing store
    pub disk_writes: u64,
    /// Sum of resident buffer sizes in bytes
    pub current_size: u64,
    /// Configured capacity ceiling in bytes
    pub max_size: u64,
    /// Number of resident entries
    pub entry_count: usize,
}
