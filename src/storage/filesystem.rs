//! Filesystem-backed object store

use std::fs;
use std::path::Path;

use super::{BackingStore, ObjectInfo, StorageError};

/// Backing store over the local filesystem
///
/// Paths are used as given; relative paths resolve against the process
/// working directory. Writes replace the whole file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemStore;

impl FilesystemStore {
    /// Create a filesystem store
    pub fn new() -> Self {
        Self
    }
}

impl BackingStore for FilesystemStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn stat(&self, path: &Path) -> Result<ObjectInfo, StorageError> {
        let meta = fs::metadata(path)?;
        Ok(ObjectInfo {
            size: meta.len(),
            last_modified: meta.modified().ok(),
        })
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(path)?)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        Ok(fs::write(path, bytes)?)
    }
}
