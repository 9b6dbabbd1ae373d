//! Filehoard - content-aware in-memory file cache
//!
//! A file cache that keeps whole file contents resident in memory and decides
//! what to evict using a composite priority score (file-type weight, size,
//! access frequency, access recency) instead of pure recency. It targets
//! workloads where not all files are equally worth caching: a small config
//! file stays protected long after a large log of the same age is gone.
//!
//! # Features
//!
//! - **Composite eviction**: type/size/frequency/recency scoring with a
//!   least-recently-touched tie-break
//! - **Buffered sessions**: per-open read/write/seek cursors over cached
//!   buffers with write-back on close
//! - **Pluggable backing store**: filesystem or any whole-object byte store
//! - **Pinned entries**: open sessions protect their entry from eviction
//! - **Lock-free statistics**: atomic hit/miss and disk I/O counters

// Public API modules
pub mod filehoard;

// Cache implementation modules
pub mod cache;
pub mod storage;

// Re-export the public API at the crate root for convenience
pub use cache::config::CacheConfig;
pub use cache::error::{CacheError, CacheResult};
pub use cache::mode::OpenMode;
pub use cache::session::CacheSession;
pub use cache::statistics::CacheStats;
pub use filehoard::{FileHoard, FileHoardBuilder};
pub use storage::{BackingStore, FilesystemStore, MemoryStore, ObjectInfo, StorageError};
