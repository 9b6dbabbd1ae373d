//! Backing-store abstraction
//!
//! The cache is a front-end for an external persistent object store. The
//! store only needs four whole-object capabilities: existence, metadata,
//! read-all, and write-all. No partial or range I/O is ever requested.

use std::path::Path;
use std::time::SystemTime;

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

/// Backing-store failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The object does not exist
    NotFound,
    /// Read or write failure
    Io(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "Object not found in backing store"),
            StorageError::Io(msg) => write!(f, "Backing store I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound,
            _ => StorageError::Io(err.to_string()),
        }
    }
}

/// Metadata of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object size in bytes
    pub size: u64,
    /// Last-modified timestamp, when the store tracks one
    pub last_modified: Option<SystemTime>,
}

/// Whole-object byte store the cache loads from and writes back to
///
/// Implementations must be safe to share across the threads the cache
/// serves; all calls are synchronous and blocking.
pub trait BackingStore: Send + Sync {
    /// Whether an object exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Object metadata, or `NotFound`
    fn stat(&self, path: &Path) -> Result<ObjectInfo, StorageError>;

    /// Read the whole object
    fn read_all(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Replace the whole object
    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;
}
