//! Cache operation errors
//!
//! Every store and session operation returns an explicit result; no failure
//! path is allowed to terminate the process. Callers decide how to surface
//! errors.

use crate::storage::StorageError;

/// Result alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Open for read/append on a path absent from both cache and backing store
    NotFound,
    /// Backing-store read or write failure
    Io(String),
    /// Operation requested without the required open capability
    InvalidMode,
    /// Seek target outside the valid buffer range
    OutOfRange,
    /// A writer session is already open against the same path
    WriterConflict,
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "Path not found in cache or backing store"),
            CacheError::Io(msg) => write!(f, "I/O error: {}", msg),
            CacheError::InvalidMode => write!(f, "Operation not permitted by open mode"),
            CacheError::OutOfRange => write!(f, "Seek target outside buffer bounds"),
            CacheError::WriterConflict => {
                write!(f, "Another writer session is open against this path")
            }
        }
    }
}

impl std::error::Error for CacheError {}

impl From<StorageError> for CacheError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => CacheError::NotFound,
            StorageError::Io(msg) => CacheError::Io(msg),
        }
    }
}
