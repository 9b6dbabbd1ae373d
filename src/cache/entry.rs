//! Cached entry data model
//!
//! A [`CacheEntry`] bundles the object's metadata, its access statistics,
//! the resident byte buffer, and the derived priority score. The store owns
//! entries through `Arc`; sessions hold a second strong reference so the
//! buffer stays valid for the session's lifetime even after `clear()`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_utils::atomic::AtomicCell;

/// Wall-clock timestamp in nanoseconds since the Unix epoch
#[inline(always)]
pub(crate) fn wall_clock_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Derive the type tag (lowercased extension with leading dot) for a path
pub fn type_tag_for(path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => String::new(),
    }
}

/// Static metadata of a cached object
///
/// `size` and `last_modified` are informational snapshots taken at load time;
/// neither is used for invalidation.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Unique cache key
    pub path: PathBuf,
    /// Type tag used for weight lookup (e.g. ".cfg", empty when none)
    pub type_tag: String,
    /// Object size at load time in bytes
    pub size: u64,
    /// Last-modified timestamp reported by the backing store
    pub last_modified: Option<SystemTime>,
}

impl FileMetadata {
    /// Create metadata for a path, deriving the type tag from its extension
    pub fn new(path: PathBuf, size: u64, last_modified: Option<SystemTime>) -> Self {
        let type_tag = type_tag_for(&path);
        Self {
            path,
            type_tag,
            size,
            last_modified,
        }
    }
}

/// Access statistics, updated on every session close
#[derive(Debug)]
pub struct AccessStats {
    /// Monotonic access counter
    access_count: AtomicU64,
    /// Last access wall-clock timestamp (nanoseconds since epoch)
    last_accessed_ns: AtomicU64,
}

impl AccessStats {
    /// Create stats stamped with the current wall clock
    pub fn new() -> Self {
        Self {
            access_count: AtomicU64::new(0),
            last_accessed_ns: AtomicU64::new(wall_clock_ns()),
        }
    }

    /// Record one access: bump the counter and stamp the wall clock
    #[inline(always)]
    pub fn record_access(&self) {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        self.last_accessed_ns
            .store(wall_clock_ns(), Ordering::Relaxed);
    }

    /// Current access count
    #[inline(always)]
    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    /// Last access timestamp in nanoseconds since epoch
    #[inline(always)]
    pub fn last_accessed_ns(&self) -> u64 {
        self.last_accessed_ns.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn set_for_test(&self, count: u64, last_accessed_ns: u64) {
        self.access_count.store(count, Ordering::Relaxed);
        self.last_accessed_ns
            .store(last_accessed_ns, Ordering::Relaxed);
    }
}

impl Default for AccessStats {
    fn default() -> Self {
        Self::new()
    }
}

/// One cached object: metadata, stats, buffer, and derived priority score
#[derive(Debug)]
pub struct CacheEntry {
    /// Static metadata snapshot
    metadata: FileMetadata,
    /// Access statistics
    stats: AccessStats,
    /// Resident byte buffer
    buffer: RwLock<Vec<u8>>,
    /// Priority score, recomputed on demand (0.0 to 1.0)
    score: AtomicCell<f32>,
    /// Open sessions holding this entry; nonzero pins it against eviction
    open_sessions: AtomicU32,
    /// Single-writer-per-path enforcement flag
    writer_active: AtomicBool,
    /// Cleared when the entry leaves the store's index
    resident: AtomicBool,
}

impl CacheEntry {
    /// Create an entry over an initial buffer
    pub fn new(metadata: FileMetadata, buffer: Vec<u8>) -> Self {
        Self {
            metadata,
            stats: AccessStats::new(),
            buffer: RwLock::new(buffer),
            score: AtomicCell::new(0.0),
            open_sessions: AtomicU32::new(0),
            writer_active: AtomicBool::new(false),
            resident: AtomicBool::new(true),
        }
    }

    /// Entry metadata
    #[inline(always)]
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// Access statistics
    #[inline(always)]
    pub fn stats(&self) -> &AccessStats {
        &self.stats
    }

    /// Read access to the resident buffer
    ///
    /// A poisoned lock is recovered rather than propagated: the buffer is
    /// plain bytes and stays structurally valid even if a writer panicked.
    #[inline(always)]
    pub fn read_buffer(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the resident buffer
    #[inline(always)]
    pub fn write_buffer(&self) -> RwLockWriteGuard<'_, Vec<u8>> {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current memory footprint in bytes
    #[inline(always)]
    pub fn memory_usage(&self) -> u64 {
        self.read_buffer().len() as u64
    }

    /// Cached priority score
    #[inline(always)]
    pub fn score(&self) -> f32 {
        self.score.load()
    }

    /// Store a freshly computed priority score
    #[inline(always)]
    pub fn set_score(&self, score: f32) {
        self.score.store(score);
    }

    /// Pin this entry for the lifetime of a session
    #[inline(always)]
    pub fn pin(&self) {
        self.open_sessions.fetch_add(1, Ordering::AcqRel);
    }

    /// Release one session's pin
    #[inline(always)]
    pub fn unpin(&self) {
        self.open_sessions.fetch_sub(1, Ordering::AcqRel);
    }

    /// Whether any session currently holds this entry
    #[inline(always)]
    pub fn is_pinned(&self) -> bool {
        self.open_sessions.load(Ordering::Acquire) > 0
    }

    /// Try to claim exclusive writer access for a new session
    #[inline(always)]
    pub fn try_acquire_writer(&self) -> bool {
        self.writer_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release writer access on session close
    #[inline(always)]
    pub fn release_writer(&self) {
        self.writer_active.store(false, Ordering::Release);
    }

    /// Whether the entry is still indexed by the store
    #[inline(always)]
    pub fn is_resident(&self) -> bool {
        self.resident.load(Ordering::Acquire)
    }

    /// Mark the entry as removed from the store's index
    #[inline(always)]
    pub fn mark_evicted(&self) {
        self.resident.store(false, Ordering::Release);
    }
}
