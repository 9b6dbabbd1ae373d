//! Simple public API for the filehoard cache
//!
//! [`FileHoard`] is a cheaply cloneable handle over one shared cache store;
//! every clone serves the same residency, accounting, and statistics. The
//! builder configures capacity and type weights before construction and can
//! swap the backing store for anything implementing
//! [`BackingStore`](crate::storage::BackingStore).

use std::path::Path;
use std::sync::Arc;

use crate::cache::config::CacheConfig;
use crate::cache::error::CacheResult;
use crate::cache::mode::OpenMode;
use crate::cache::session::CacheSession;
use crate::cache::statistics::CacheStats;
use crate::cache::store::CacheStore;
use crate::storage::{BackingStore, FilesystemStore};

/// Content-aware in-memory file cache
///
/// Cloning shares the underlying store. All operations are synchronous and
/// safe to call from multiple threads; store-mutating operations are
/// serialized by one coarse lock (see [`crate::cache::store`]).
#[derive(Debug)]
pub struct FileHoard<S: BackingStore = FilesystemStore> {
    store: Arc<CacheStore<S>>,
}

impl<S: BackingStore> Clone for FileHoard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl FileHoard<FilesystemStore> {
    /// Create a filesystem-backed cache with default configuration
    pub fn new() -> Self {
        FileHoardBuilder::new().build()
    }

    /// Start building a filesystem-backed cache
    pub fn builder() -> FileHoardBuilder<FilesystemStore> {
        FileHoardBuilder::new()
    }
}

impl Default for FileHoard<FilesystemStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BackingStore> FileHoard<S> {
    /// Create a cache from a config over a custom backing store
    pub fn with_config(config: CacheConfig, backing: S) -> Self {
        Self {
            store: Arc::new(CacheStore::new(config, backing)),
        }
    }

    /// Open a session against a path
    pub fn open(&self, path: impl AsRef<Path>, mode: OpenMode) -> CacheResult<CacheSession<S>> {
        self.store.open(path.as_ref(), mode)
    }

    /// Close a session, flushing dirty data and recording the access
    ///
    /// Equivalent to [`CacheSession::close`]; provided so callers holding
    /// the cache handle can close sessions through it.
    pub fn close(&self, session: CacheSession<S>) -> CacheResult<()> {
        session.close()
    }

    /// Write back every resident buffer unconditionally
    pub fn flush_all(&self) -> CacheResult<()> {
        self.store.flush_all()
    }

    /// Flush, then drop every resident entry
    pub fn clear(&self) -> CacheResult<()> {
        self.store.clear()
    }

    /// Set the capacity ceiling; lowering it evicts immediately
    pub fn resize(&self, max_size_bytes: u64) {
        self.store.resize(max_size_bytes)
    }

    /// Set a per-type priority weight, clamped to `[0, 1]`
    pub fn set_type_weight(&self, tag: &str, weight: f32) {
        self.store.set_type_weight(tag, weight)
    }

    /// Whether a path is currently resident
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.store.contains(path.as_ref())
    }

    /// Point-in-time statistics snapshot
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

/// Builder for [`FileHoard`]
#[derive(Debug)]
pub struct FileHoardBuilder<S: BackingStore = FilesystemStore> {
    config: CacheConfig,
    backing: S,
}

impl FileHoardBuilder<FilesystemStore> {
    /// Start from the default configuration over the local filesystem
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            backing: FilesystemStore::new(),
        }
    }
}

impl Default for FileHoardBuilder<FilesystemStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BackingStore> FileHoardBuilder<S> {
    /// Set the capacity ceiling in bytes
    pub fn max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.config.max_size_bytes = max_size_bytes;
        self
    }

    /// Set a per-type priority weight, clamped at construction
    pub fn type_weight(mut self, tag: impl Into<String>, weight: f32) -> Self {
        self.config.type_weights.insert(tag.into(), weight);
        self
    }

    /// Start from an empty weight table instead of the built-in defaults
    pub fn without_default_type_weights(mut self) -> Self {
        self.config.use_default_type_weights = false;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the backing store
    pub fn backing_store<T: BackingStore>(self, backing: T) -> FileHoardBuilder<T> {
        FileHoardBuilder {
            config: self.config,
            backing,
        }
    }

    /// Build the cache
    pub fn build(self) -> FileHoard<S> {
        FileHoard::with_config(self.config, self.backing)
    }
}
