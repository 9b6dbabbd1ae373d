//! In-memory object store
//!
//! A lock-free map of path to bytes, useful for tests and for embedding the
//! cache over non-filesystem object stores.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashmap::DashMap;

use super::{BackingStore, ObjectInfo, StorageError};

/// Backing store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<PathBuf, (Vec<u8>, SystemTime)>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the cache
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.objects
            .insert(path.into(), (bytes, SystemTime::now()));
    }

    /// Stored bytes for a path, bypassing the cache
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.objects.get(path).map(|obj| obj.0.clone())
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl BackingStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.objects.contains_key(path)
    }

    fn stat(&self, path: &Path) -> Result<ObjectInfo, StorageError> {
        self.objects
            .get(path)
            .map(|obj| ObjectInfo {
                size: obj.0.len() as u64,
                last_modified: Some(obj.1),
            })
            .ok_or(StorageError::NotFound)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.objects
            .get(path)
            .map(|obj| obj.0.clone())
            .ok_or(StorageError::NotFound)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        self.objects
            .insert(path.to_path_buf(), (bytes.to_vec(), SystemTime::now()));
        Ok(())
    }
}
