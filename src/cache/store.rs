//! Cache store: residency, capacity accounting, and room-making
//!
//! The store owns the path-to-entry map, the recency index, and the size
//! accounting, and orchestrates loads, eviction, flushes, resizes, and
//! statistics. One coarse mutex serializes every store-mutating operation
//! end to end, including backing-store I/O performed inside open, close, and
//! flush. That bounds throughput by the slowest disk operation in flight; it
//! is a deliberate simplicity-over-throughput tradeoff that keeps hit/miss
//! counters and size accounting exactly consistent. Session data copies do
//! not take this lock (see [`super::session`]).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::config::CacheConfig;
use super::entry::{wall_clock_ns, CacheEntry, FileMetadata};
use super::error::{CacheError, CacheResult};
use super::eviction::{EvictionCandidate, EvictionPolicy};
use super::mode::OpenMode;
use super::recency::RecencyIndex;
use super::scoring::{PriorityScorer, TypeWeights};
use super::session::CacheSession;
use super::statistics::{CacheStatistics, CacheStats};
use crate::storage::{BackingStore, StorageError};

/// Mutable store state guarded by the coarse lock
#[derive(Debug)]
struct StoreInner {
    /// Resident entries keyed by path
    entries: HashMap<PathBuf, Arc<CacheEntry>>,
    /// Recency ordering, eviction tie-break only
    recency: RecencyIndex,
    /// Sum of resident buffer sizes in bytes
    current_size: u64,
    /// Capacity ceiling in bytes
    max_size: u64,
}

/// Cache store over a backing object store
///
/// Invariants held after every mutating operation: `current_size` equals the
/// sum of resident buffer sizes, and a path is in the entry map and the
/// recency index together or in neither.
#[derive(Debug)]
pub struct CacheStore<S: BackingStore> {
    backing: S,
    inner: Mutex<StoreInner>,
    stats: CacheStatistics,
    weights: TypeWeights,
    scorer: PriorityScorer,
    policy: EvictionPolicy,
}

impl<S: BackingStore> CacheStore<S> {
    /// Create a store from a config and a backing store
    pub fn new(config: CacheConfig, backing: S) -> Self {
        Self {
            backing,
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                recency: RecencyIndex::new(),
                current_size: 0,
                max_size: config.max_size_bytes,
            }),
            stats: CacheStatistics::new(),
            weights: config.build_type_weights(),
            scorer: PriorityScorer,
            policy: EvictionPolicy,
        }
    }

    #[inline(always)]
    fn lock_inner(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session against a path
    ///
    /// A resident path is a hit: no disk access, recency refreshed. A miss
    /// with [`OpenMode::CREATE`] inserts an empty entry without consulting
    /// the backing store at all; any object already stored there is replaced
    /// by the next write-back. A miss without `CREATE` loads the whole
    /// object, making room first. Opening with a write capability claims the
    /// entry's single writer slot and fails with
    /// [`CacheError::WriterConflict`] while another writer session is open.
    pub fn open(self: &Arc<Self>, path: &Path, mode: OpenMode) -> CacheResult<CacheSession<S>> {
        let mut inner = self.lock_inner();

        if let Some(entry) = inner.entries.get(path).cloned() {
            self.stats.record_hit();
            inner.recency.touch(path);
            drop(inner);
            log::trace!("cache hit: {}", path.display());
            return self.new_session(entry, mode);
        }

        self.stats.record_miss();

        if mode.contains(OpenMode::CREATE) {
            let metadata = FileMetadata::new(path.to_path_buf(), 0, None);
            let entry = Arc::new(CacheEntry::new(metadata, Vec::new()));
            entry.set_score(self.scorer.score(&entry, wall_clock_ns(), &self.weights));
            inner.entries.insert(path.to_path_buf(), Arc::clone(&entry));
            inner.recency.touch(path);
            drop(inner);
            log::debug!("created empty entry: {}", path.display());
            return self.new_session(entry, mode);
        }

        let entry = self.load(&mut inner, path)?;
        drop(inner);
        self.new_session(entry, mode)
    }

    /// Load a path from the backing store into a fresh resident entry
    ///
    /// The whole object is read while the store lock is held. A stat failure
    /// that is not `NotFound` degrades to a zero-size entry rather than
    /// propagating; a failed read is a hard error.
    fn load(
        &self,
        inner: &mut StoreInner,
        path: &Path,
    ) -> CacheResult<Arc<CacheEntry>> {
        if !self.backing.exists(path) {
            return Err(CacheError::NotFound);
        }

        let info = match self.backing.stat(path) {
            Ok(info) => info,
            Err(StorageError::NotFound) => return Err(CacheError::NotFound),
            Err(StorageError::Io(msg)) => {
                // Documented lossy fallback: unreadable metadata yields an
                // empty resident entry instead of failing the open.
                log::warn!(
                    "stat failed for {}, degrading to zero-size entry: {}",
                    path.display(),
                    msg
                );
                return Ok(self.insert_degraded(inner, path));
            }
        };

        self.make_room(inner, info.size);

        let bytes = self.backing.read_all(path)?;
        self.stats.record_disk_read();

        let metadata = FileMetadata::new(path.to_path_buf(), bytes.len() as u64, info.last_modified);
        let size = bytes.len() as u64;
        let entry = Arc::new(CacheEntry::new(metadata, bytes));
        entry.set_score(self.scorer.score(&entry, wall_clock_ns(), &self.weights));

        inner.current_size += size;
        inner.entries.insert(path.to_path_buf(), Arc::clone(&entry));
        inner.recency.touch(path);
        log::debug!("loaded {} ({} bytes)", path.display(), size);
        Ok(entry)
    }

    /// Named fallback for metadata-retrieval failures: zero-size entry
    fn insert_degraded(&self, inner: &mut StoreInner, path: &Path) -> Arc<CacheEntry> {
        let metadata = FileMetadata::new(path.to_path_buf(), 0, None);
        let entry = Arc::new(CacheEntry::new(metadata, Vec::new()));
        entry.set_score(self.scorer.score(&entry, wall_clock_ns(), &self.weights));
        inner.entries.insert(path.to_path_buf(), Arc::clone(&entry));
        inner.recency.touch(path);
        entry
    }

    /// Wrap an entry into a session, enforcing single-writer-per-path
    fn new_session(self: &Arc<Self>, entry: Arc<CacheEntry>, mode: OpenMode) -> CacheResult<CacheSession<S>> {
        entry.pin();
        if mode.is_writer() && !entry.try_acquire_writer() {
            entry.unpin();
            return Err(CacheError::WriterConflict);
        }
        Ok(CacheSession::new(Arc::clone(self), entry, mode))
    }

    /// Free capacity for `required` additional bytes
    ///
    /// No-op while `current + required` fits under the ceiling. Otherwise
    /// every resident score is recomputed fresh (scores are time-dependent,
    /// and a stale score could protect an entry that has gone cold), then
    /// the lowest-scored unpinned entry is evicted repeatedly. If a positive
    /// requirement still does not fit once nothing evictable remains, the
    /// ceiling grows to exactly `current + required`: the store never
    /// refuses an object solely for being larger than the configured
    /// maximum. With `required == 0` (resize enforcement) the ceiling is
    /// left alone, so pinned entries may hold `current_size` above it until
    /// their sessions close.
    fn make_room(&self, inner: &mut StoreInner, required: u64) {
        if inner.current_size + required <= inner.max_size {
            return;
        }

        let now = wall_clock_ns();
        for entry in inner.entries.values() {
            entry.set_score(self.scorer.score(entry, now, &self.weights));
        }

        while inner.current_size + required > inner.max_size && !inner.entries.is_empty() {
            let victim = {
                let recency = &inner.recency;
                self.policy
                    .select_victim(inner.entries.iter().map(|(path, entry)| {
                        EvictionCandidate {
                            path,
                            score: entry.score(),
                            touch_tick: recency.tick_of(path).unwrap_or(0),
                            pinned: entry.is_pinned(),
                        }
                    }))
                    .map(Path::to_path_buf)
            };
            match victim {
                Some(path) => self.evict(inner, &path),
                // Everything left is pinned by open sessions
                None => break,
            }
        }

        if required > 0 && inner.current_size + required > inner.max_size {
            let new_max = inner.current_size + required;
            log::debug!(
                "growing cache ceiling {} -> {} bytes to fit requirement",
                inner.max_size,
                new_max
            );
            inner.max_size = new_max;
        }
    }

    /// Remove one entry from the index and the accounting
    ///
    /// Eviction never sees unwritten session data: a dirty buffer only
    /// exists while its writer session is open, open sessions pin their
    /// entry, and close flushes before unpinning.
    fn evict(&self, inner: &mut StoreInner, path: &Path) {
        if let Some(entry) = inner.entries.remove(path) {
            inner.current_size -= entry.memory_usage();
            inner.recency.remove(path);
            entry.mark_evicted();
            log::debug!(
                "evicted {} (score {:.3}, {} bytes)",
                path.display(),
                entry.score(),
                entry.memory_usage()
            );
        }
    }

    /// Write one entry's buffer back to the backing store
    ///
    /// Caller holds the store lock; I/O is serialized deliberately.
    fn write_back(&self, entry: &CacheEntry) -> CacheResult<()> {
        let buffer = entry.read_buffer();
        self.backing
            .write_all(&entry.metadata().path, &buffer)
            .map_err(CacheError::from)?;
        self.stats.record_disk_write();
        Ok(())
    }

    /// Grow an entry's buffer by `delta` bytes on behalf of a writing session
    ///
    /// Makes room and accounts the delta while the entry is resident; a
    /// detached entry (removed by `clear`) just grows its private buffer.
    pub(crate) fn reserve_growth(&self, entry: &CacheEntry, delta: u64) -> CacheResult<()> {
        let mut inner = self.lock_inner();
        if entry.is_resident() {
            self.make_room(&mut inner, delta);
            let mut buffer = entry.write_buffer();
            let new_len = buffer.len() + delta as usize;
            buffer.resize(new_len, 0);
            drop(buffer);
            inner.current_size += delta;
        } else {
            let mut buffer = entry.write_buffer();
            let new_len = buffer.len() + delta as usize;
            buffer.resize(new_len, 0);
        }
        Ok(())
    }

    /// Explicit session flush, serialized under the store lock
    pub(crate) fn flush_entry(&self, entry: &CacheEntry) -> CacheResult<()> {
        let _inner = self.lock_inner();
        self.write_back(entry)
    }

    /// Session close: write-back when dirty, then stats and score update
    ///
    /// The access counts even when the session never read or wrote. The
    /// whole close, including the write-back, runs under the store lock.
    pub(crate) fn complete_session(
        &self,
        entry: &CacheEntry,
        dirty: bool,
        was_writer: bool,
    ) -> CacheResult<()> {
        let _inner = self.lock_inner();
        let flushed = if dirty { self.write_back(entry) } else { Ok(()) };
        entry.stats().record_access();
        entry.set_score(self.scorer.score(entry, wall_clock_ns(), &self.weights));
        if was_writer {
            entry.release_writer();
        }
        entry.unpin();
        flushed
    }

    /// Write back every resident buffer unconditionally
    ///
    /// Idempotent; used for shutdown and explicit sync. Failures are logged
    /// and the pass continues; the first error is returned.
    pub fn flush_all(&self) -> CacheResult<()> {
        let inner = self.lock_inner();
        let mut first_error = None;
        for entry in inner.entries.values() {
            if let Err(err) = self.write_back(entry) {
                log::warn!(
                    "flush failed for {}: {}",
                    entry.metadata().path.display(),
                    err
                );
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Flush, then drop every entry and reset size accounting
    pub fn clear(&self) -> CacheResult<()> {
        let mut inner = self.lock_inner();
        let mut first_error = None;
        for entry in inner.entries.values() {
            if let Err(err) = self.write_back(entry) {
                log::warn!(
                    "flush during clear failed for {}: {}",
                    entry.metadata().path.display(),
                    err
                );
                first_error.get_or_insert(err);
            }
        }
        for entry in inner.entries.values() {
            entry.mark_evicted();
        }
        inner.entries.clear();
        inner.recency.clear();
        inner.current_size = 0;
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Set the capacity ceiling; lowering it evicts immediately
    ///
    /// The requested ceiling always sticks. Lowering it below what pinned
    /// sessions hold leaves `current_size` above the ceiling until those
    /// sessions close; the next room-making pass then evicts down to it.
    pub fn resize(&self, new_max_bytes: u64) {
        let mut inner = self.lock_inner();
        inner.max_size = new_max_bytes;
        if inner.current_size > inner.max_size {
            self.make_room(&mut inner, 0);
        }
    }

    /// Set a type weight (clamped to `[0, 1]`) and rescore matching entries
    ///
    /// Entries of other types keep their stale score until their next touch;
    /// a whole-store rescore only happens inside room-making.
    pub fn set_type_weight(&self, tag: &str, weight: f32) {
        self.weights.set(tag, weight);
        let normalized = TypeWeights::normalize(tag);
        let inner = self.lock_inner();
        let now = wall_clock_ns();
        for entry in inner.entries.values() {
            if entry.metadata().type_tag == normalized {
                entry.set_score(self.scorer.score(entry, now, &self.weights));
            }
        }
    }

    /// Whether a path is currently resident
    pub fn contains(&self, path: &Path) -> bool {
        self.lock_inner().entries.contains_key(path)
    }

    /// Point-in-time statistics snapshot
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock_inner();
        self.stats
            .snapshot(inner.current_size, inner.max_size, inner.entries.len())
    }

}

impl<S: BackingStore> Drop for CacheStore<S> {
    /// Best-effort write-back of all resident buffers on teardown
    fn drop(&mut self) {
        if let Err(err) = self.flush_all() {
            log::warn!("flush on drop failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::cache::config::CacheConfig;
    use crate::storage::{MemoryStore, ObjectInfo};

    fn cache(max_size: u64, backing: MemoryStore) -> Arc<CacheStore<MemoryStore>> {
        let config = CacheConfig {
            max_size_bytes: max_size,
            ..CacheConfig::default()
        };
        Arc::new(CacheStore::new(config, backing))
    }

    fn resident_sum(store: &CacheStore<MemoryStore>) -> u64 {
        store
            .lock_inner()
            .entries
            .values()
            .map(|e| e.memory_usage())
            .sum()
    }

    fn open_close(store: &Arc<CacheStore<MemoryStore>>, path: &str, times: usize) {
        for _ in 0..times {
            let session = store
                .open(Path::new(path), OpenMode::read_only())
                .expect("open");
            session.close().expect("close");
        }
    }

    #[test]
    fn hit_miss_and_disk_read_accounting() {
        let backing = MemoryStore::new();
        backing.insert("a.txt", vec![1u8; 100]);
        let store = cache(10_000, backing);

        open_close(&store, "a.txt", 1);
        open_close(&store, "a.txt", 2);

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
        // Resident reopens never touch the disk
        assert_eq!(stats.disk_reads, 1);
    }

    #[test]
    fn open_missing_for_read_fails() {
        let store = cache(10_000, MemoryStore::new());
        let err = store
            .open(Path::new("missing.txt"), OpenMode::read_only())
            .unwrap_err();
        assert_eq!(err, CacheError::NotFound);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn create_mode_inserts_empty_entry_without_disk_read() {
        let store = cache(10_000, MemoryStore::new());
        let mut session = store
            .open(Path::new("new.log"), OpenMode::read_write())
            .expect("open");
        assert_eq!(store.stats().disk_reads, 0);
        assert!(store.contains(Path::new("new.log")));

        session.write(b"fresh").expect("write");
        session.close().expect("close");

        let stats = store.stats();
        assert_eq!(stats.disk_writes, 1);
        assert_eq!(stats.current_size, 5);
    }

    #[test]
    fn create_capable_miss_ignores_stored_object() {
        let backing = MemoryStore::new();
        backing.insert("existing.txt", b"old contents".to_vec());
        let store = cache(10_000, backing);

        // Cold open with CREATE: the stored object is not probed or loaded
        let mut session = store
            .open(Path::new("existing.txt"), OpenMode::read_write())
            .expect("open");
        assert_eq!(store.stats().disk_reads, 0);
        let mut buf = [0u8; 16];
        assert_eq!(session.read(&mut buf).expect("read"), 0);

        session.write(b"new").expect("write");
        session.close().expect("close");

        // Write-back replaced the old bytes wholesale
        assert_eq!(store.stats().disk_reads, 0);
        assert_eq!(
            store.backing.get(Path::new("existing.txt")),
            Some(b"new".to_vec())
        );
    }

    #[test]
    fn size_accounting_matches_resident_buffers() {
        let backing = MemoryStore::new();
        backing.insert("a.bin", vec![0u8; 300]);
        backing.insert("b.bin", vec![0u8; 450]);
        let store = cache(10_000, backing);

        open_close(&store, "a.bin", 1);
        open_close(&store, "b.bin", 2);

        let mut session = store
            .open(Path::new("c.bin"), OpenMode::read_write())
            .expect("open");
        session.write(&vec![7u8; 128]).expect("write");
        session.close().expect("close");

        assert_eq!(store.stats().current_size, resident_sum(&store));
        assert_eq!(store.stats().current_size, 300 + 450 + 128);
    }

    #[test]
    fn scored_eviction_overrides_insertion_order() {
        let backing = MemoryStore::new();
        backing.insert("a.cfg", vec![0u8; 400]);
        backing.insert("b.tmp", vec![0u8; 500]);
        backing.insert("c.dat", vec![0u8; 300]);
        let store = cache(1000, backing);
        store.set_type_weight(".tmp", 0.2);

        // A: high type weight, several recent accesses. B: low weight, one.
        open_close(&store, "a.cfg", 5);
        open_close(&store, "b.tmp", 1);

        // Inserting C needs room; exactly one eviction suffices and it must
        // be B despite A being the older insertion.
        open_close(&store, "c.dat", 1);

        assert!(store.contains(Path::new("a.cfg")));
        assert!(!store.contains(Path::new("b.tmp")));
        assert!(store.contains(Path::new("c.dat")));
        assert_eq!(store.stats().current_size, 700);
        assert_eq!(store.stats().current_size, resident_sum(&store));
    }

    #[test]
    fn raised_type_weight_changes_eviction_outcome() {
        let backing = MemoryStore::new();
        backing.insert("x.cfg", vec![0u8; 450]);
        backing.insert("y.tmp", vec![0u8; 450]);
        backing.insert("z.dat", vec![0u8; 450]);
        let config = CacheConfig {
            max_size_bytes: 1000,
            use_default_type_weights: false,
            ..CacheConfig::default()
        };
        let store = Arc::new(CacheStore::new(config, backing));

        // x is the older touch, so pure recency would evict it first.
        open_close(&store, "x.cfg", 1);
        open_close(&store, "y.tmp", 1);
        store.set_type_weight(".cfg", 1.0);

        open_close(&store, "z.dat", 1);

        assert!(store.contains(Path::new("x.cfg")));
        assert!(!store.contains(Path::new("y.tmp")));
    }

    #[test]
    fn oversized_object_grows_ceiling_exactly() {
        let backing = MemoryStore::new();
        backing.insert("big.bin", vec![0u8; 500]);
        let store = cache(100, backing);

        open_close(&store, "big.bin", 1);

        let stats = store.stats();
        assert!(store.contains(Path::new("big.bin")));
        assert_eq!(stats.current_size, 500);
        assert_eq!(stats.max_size, 500);
    }

    #[test]
    fn resize_down_evicts_to_fit() {
        let backing = MemoryStore::new();
        backing.insert("a.bin", vec![0u8; 400]);
        backing.insert("b.bin", vec![0u8; 400]);
        let store = cache(1000, backing);

        open_close(&store, "a.bin", 1);
        open_close(&store, "b.bin", 1);
        assert_eq!(store.stats().current_size, 800);

        store.resize(500);

        let stats = store.stats();
        assert_eq!(stats.max_size, 500);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.current_size, 400);
        assert_eq!(stats.current_size, resident_sum(&store));
    }

    #[test]
    fn resize_below_pinned_total_keeps_requested_ceiling() {
        let backing = MemoryStore::new();
        backing.insert("held.bin", vec![0u8; 600]);
        backing.insert("small.bin", vec![0u8; 50]);
        let store = cache(1000, backing);

        let held = store
            .open(Path::new("held.bin"), OpenMode::read_only())
            .expect("open");

        // The pinned entry cannot be evicted, but the lowered ceiling must
        // stick rather than silently growing back to cover it.
        store.resize(100);
        let stats = store.stats();
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.current_size, 600);
        assert!(store.contains(Path::new("held.bin")));

        held.close().expect("close");

        // The next room-making pass enforces the lowered ceiling
        open_close(&store, "small.bin", 1);
        let stats = store.stats();
        assert_eq!(stats.max_size, 100);
        assert!(!store.contains(Path::new("held.bin")));
        assert_eq!(stats.current_size, 50);
    }

    #[test]
    fn pinned_entries_survive_room_making() {
        let backing = MemoryStore::new();
        backing.insert("held.bin", vec![0u8; 600]);
        backing.insert("other.bin", vec![0u8; 600]);
        let store = cache(1000, backing);

        let held = store
            .open(Path::new("held.bin"), OpenMode::read_only())
            .expect("open");

        // The only eviction candidate is pinned, so the ceiling grows
        // instead of invalidating the open session's buffer.
        open_close(&store, "other.bin", 1);

        assert!(store.contains(Path::new("held.bin")));
        assert!(store.contains(Path::new("other.bin")));
        assert_eq!(store.stats().max_size, 1200);

        held.close().expect("close");
    }

    #[test]
    fn writer_conflict_is_rejected_then_released() {
        let backing = MemoryStore::new();
        backing.insert("shared.txt", b"data".to_vec());
        let store = cache(10_000, backing);

        let writer = store
            .open(Path::new("shared.txt"), OpenMode::read_write())
            .expect("first writer");
        let err = store
            .open(Path::new("shared.txt"), OpenMode::read_write())
            .unwrap_err();
        assert_eq!(err, CacheError::WriterConflict);

        // Concurrent readers are fine
        let reader = store
            .open(Path::new("shared.txt"), OpenMode::read_only())
            .expect("reader");
        reader.close().expect("close reader");

        writer.close().expect("close writer");
        let again = store
            .open(Path::new("shared.txt"), OpenMode::read_write())
            .expect("writer after release");
        again.close().expect("close");
    }

    #[test]
    fn flush_all_writes_every_resident_buffer() {
        let backing = MemoryStore::new();
        backing.insert("a.txt", b"alpha".to_vec());
        let store = cache(10_000, backing);

        open_close(&store, "a.txt", 1);
        store.flush_all().expect("flush");
        store.flush_all().expect("idempotent flush");

        // Unconditional write-back, one disk write per pass
        assert_eq!(store.stats().disk_writes, 2);
    }

    #[test]
    fn clear_flushes_then_empties() {
        let backing = MemoryStore::new();
        let store = cache(10_000, backing);

        let mut session = store
            .open(Path::new("notes.txt"), OpenMode::read_write())
            .expect("open");
        session.write(b"keep me").expect("write");
        session.close().expect("close");

        store.clear().expect("clear");

        let stats = store.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.current_size, 0);
        assert!(!store.contains(Path::new("notes.txt")));

        // Reopening reloads from the backing store
        let mut session = store
            .open(Path::new("notes.txt"), OpenMode::read_only())
            .expect("reopen");
        let mut buf = [0u8; 16];
        let n = session.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"keep me");
        session.close().expect("close");
    }

    #[test]
    fn open_close_counts_as_access() {
        let backing = MemoryStore::new();
        backing.insert("a.txt", b"x".to_vec());
        let store = cache(10_000, backing);

        open_close(&store, "a.txt", 3);

        let entry = store
            .lock_inner()
            .entries
            .get(Path::new("a.txt"))
            .cloned()
            .expect("resident");
        assert_eq!(entry.stats().access_count(), 3);
    }

    /// Backing store whose metadata lookups always fail
    #[derive(Debug, Default)]
    struct BrokenStatStore {
        objects: MemoryStore,
    }

    impl BackingStore for BrokenStatStore {
        fn exists(&self, path: &Path) -> bool {
            self.objects.exists(path)
        }
        fn stat(&self, _path: &Path) -> Result<ObjectInfo, StorageError> {
            Err(StorageError::Io("stat unavailable".into()))
        }
        fn read_all(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
            self.objects.read_all(path)
        }
        fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
            self.objects.write_all(path, bytes)
        }
    }

    #[test]
    fn stat_failure_degrades_to_zero_size_entry() {
        let backing = BrokenStatStore::default();
        backing.objects.insert("weird.dat", vec![9u8; 64]);
        let store = Arc::new(CacheStore::new(
            CacheConfig {
                max_size_bytes: 10_000,
                ..CacheConfig::default()
            },
            backing,
        ));

        let mut session = store
            .open(Path::new("weird.dat"), OpenMode::read_only())
            .expect("degraded open");
        let mut buf = [0u8; 8];
        assert_eq!(session.read(&mut buf).expect("read"), 0);
        session.close().expect("close");

        let stats = store.stats();
        assert_eq!(stats.current_size, 0);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.disk_reads, 0);
    }

    #[test]
    fn concurrent_readers_share_one_load() {
        let backing = MemoryStore::new();
        backing.insert("shared.bin", vec![42u8; 256]);
        let store = cache(10_000, backing);

        // Prime the cache so every thread hits
        open_close(&store, "shared.bin", 1);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for _ in 0..25 {
                    let mut session = store
                        .open(Path::new("shared.bin"), OpenMode::read_only())
                        .expect("open");
                    let mut buf = [0u8; 256];
                    let n = session.read(&mut buf).expect("read");
                    assert_eq!(n, 256);
                    assert!(buf.iter().all(|&b| b == 42));
                    session.close().expect("close");
                }
            }));
        }
        for handle in handles {
            handle.join().expect("reader thread");
        }

        let stats = store.stats();
        assert_eq!(stats.disk_reads, 1);
        assert_eq!(stats.hits + stats.misses, 101);
        assert_eq!(stats.hits, 100);
    }
}
