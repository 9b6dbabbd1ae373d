//! Recency index for eviction tie-breaking
//!
//! Orders resident paths by a monotonic touch tick. The index is only
//! consulted when composite scores are indistinguishable; it never drives
//! eviction on its own. A path is present here exactly when it is present in
//! the store's entry map.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Tick-ordered recency index over resident paths
#[derive(Debug, Default)]
pub struct RecencyIndex {
    /// Touch tick to path, ascending tick = least recently touched first
    by_tick: BTreeMap<u64, PathBuf>,
    /// Path to its current tick
    by_path: HashMap<PathBuf, u64>,
    /// Monotonic touch clock
    clock: u64,
}

impl RecencyIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path as most recently touched, inserting it if absent
    pub fn touch(&mut self, path: &Path) {
        if let Some(tick) = self.by_path.remove(path) {
            self.by_tick.remove(&tick);
        }
        self.clock += 1;
        self.by_tick.insert(self.clock, path.to_path_buf());
        self.by_path.insert(path.to_path_buf(), self.clock);
    }

    /// Remove a path from the index
    pub fn remove(&mut self, path: &Path) {
        if let Some(tick) = self.by_path.remove(path) {
            self.by_tick.remove(&tick);
        }
    }

    /// Touch tick for a path, lower = touched longer ago
    #[inline(always)]
    pub fn tick_of(&self, path: &Path) -> Option<u64> {
        self.by_path.get(path).copied()
    }

    /// Least recently touched path, if any
    pub fn least_recent(&self) -> Option<&Path> {
        self.by_tick.values().next().map(PathBuf::as_path)
    }

    /// Number of indexed paths
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Whether the index is empty
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Drop all indexed paths
    pub fn clear(&mut self) {
        self.by_tick.clear();
        self.by_path.clear();
    }
}
