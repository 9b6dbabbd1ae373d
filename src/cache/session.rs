//! Per-open session handle
//!
//! A session is a cursor into one entry's buffer, analogous to a classic
//! buffered file handle: read, write, seek, tell, flush, and write-back on
//! close. Data copies run against the entry's own lock without taking the
//! store lock; only buffer growth (room-making and size accounting) and
//! flushes go back to the store. Dropping a session closes it implicitly,
//! flushing dirty data and counting the access.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use super::entry::CacheEntry;
use super::error::{CacheError, CacheResult};
use super::mode::OpenMode;
use super::store::CacheStore;
use crate::storage::BackingStore;

/// Open read/write cursor bound to one cache entry
///
/// The session shares ownership of its entry, so the buffer stays valid for
/// the session's lifetime even if the store drops the entry from its index.
/// While open, the session pins the entry against eviction.
#[derive(Debug)]
pub struct CacheSession<S: BackingStore> {
    store: Arc<CacheStore<S>>,
    entry: Arc<CacheEntry>,
    position: usize,
    mode: OpenMode,
    dirty: bool,
    closed: bool,
}

impl<S: BackingStore> CacheSession<S> {
    pub(crate) fn new(store: Arc<CacheStore<S>>, entry: Arc<CacheEntry>, mode: OpenMode) -> Self {
        Self {
            store,
            entry,
            position: 0,
            mode,
            dirty: false,
            closed: false,
        }
    }

    /// Path this session was opened against
    pub fn path(&self) -> &Path {
        &self.entry.metadata().path
    }

    /// Capability set the session was opened with
    #[inline(always)]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Current buffer length in bytes
    pub fn len(&self) -> u64 {
        self.entry.memory_usage()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether unflushed writes are pending
    #[inline(always)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read up to `buf.len()` bytes from the cursor position
    ///
    /// Returns the number of bytes copied: 0 at end of buffer, and always 0
    /// on a session opened without [`OpenMode::READ`] (a permissive no-op,
    /// not an error).
    pub fn read(&mut self, buf: &mut [u8]) -> CacheResult<usize> {
        if !self.mode.contains(OpenMode::READ) {
            return Ok(0);
        }
        let buffer = self.entry.read_buffer();
        let available = buffer.len().saturating_sub(self.position);
        let count = buf.len().min(available);
        if count > 0 {
            buf[..count].copy_from_slice(&buffer[self.position..self.position + count]);
            self.position += count;
        }
        Ok(count)
    }

    /// Write `data` at the cursor position, growing the buffer as needed
    ///
    /// Returns 0 without writing on a session lacking [`OpenMode::WRITE`] and
    /// [`OpenMode::APPEND`]. In append mode the cursor is forced to the end
    /// of the buffer first. Growth requests room-making from the store for
    /// exactly the size delta before any byte is copied.
    pub fn write(&mut self, data: &[u8]) -> CacheResult<usize> {
        if !self.mode.is_writer() || data.is_empty() {
            return Ok(0);
        }

        // Single writer per path: the buffer length is stable between this
        // probe and the copy below.
        let len = self.entry.read_buffer().len();
        if self.mode.contains(OpenMode::APPEND) && self.position != len {
            self.position = len;
        }

        let end = self.position + data.len();
        if end > len {
            self.store
                .reserve_growth(&self.entry, (end - len) as u64)?;
        }

        let mut buffer = self.entry.write_buffer();
        buffer[self.position..end].copy_from_slice(data);
        drop(buffer);

        self.position = end;
        self.dirty = true;
        Ok(data.len())
    }

    /// Move the cursor; the target must stay within `[0, len]`
    ///
    /// Seeking past the end of the buffer is never permitted, even before a
    /// write: growth happens through the write path only. On failure the
    /// cursor is unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> CacheResult<u64> {
        let len = self.entry.read_buffer().len() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(offset) => self.position as i128 + offset as i128,
            SeekFrom::End(offset) => len + offset as i128,
        };
        if target < 0 || target > len {
            return Err(CacheError::OutOfRange);
        }
        self.position = target as usize;
        Ok(self.position as u64)
    }

    /// Current cursor position
    #[inline(always)]
    pub fn tell(&self) -> u64 {
        self.position as u64
    }

    /// Write the buffer back to the backing store if dirty
    pub fn flush(&mut self) -> CacheResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.store.flush_entry(&self.entry)?;
        self.dirty = false;
        Ok(())
    }

    /// Close the session, flushing dirty data and recording the access
    ///
    /// The entry's access count, last-accessed timestamp, and score are
    /// updated even when nothing was read or written. Dropping the session
    /// performs the same close implicitly, discarding any flush error after
    /// logging it.
    pub fn close(mut self) -> CacheResult<()> {
        self.finish()
    }

    fn finish(&mut self) -> CacheResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self
            .store
            .complete_session(&self.entry, self.dirty, self.mode.is_writer());
        self.dirty = false;
        result
    }
}

impl<S: BackingStore> Drop for CacheSession<S> {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            log::warn!(
                "implicit close failed for {}: {}",
                self.entry.metadata().path.display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::config::CacheConfig;
    use crate::storage::MemoryStore;

    fn cache_with(seed: &[(&str, &[u8])]) -> Arc<CacheStore<MemoryStore>> {
        let backing = MemoryStore::new();
        for (path, bytes) in seed {
            backing.insert(*path, bytes.to_vec());
        }
        Arc::new(CacheStore::new(
            CacheConfig {
                max_size_bytes: 10_000,
                ..CacheConfig::default()
            },
            backing,
        ))
    }

    #[test]
    fn write_then_read_round_trips_without_flush() {
        let store = cache_with(&[]);
        let mut session = store
            .open(Path::new("fresh.txt"), OpenMode::read_write())
            .expect("open");

        session.write(b"hello hoard").expect("write");
        session.seek(SeekFrom::Start(0)).expect("seek");

        let mut buf = [0u8; 32];
        let n = session.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"hello hoard");
        session.close().expect("close");
    }

    #[test]
    fn append_forces_cursor_to_end() {
        let store = cache_with(&[("log.txt", b"abc")]);
        let mut session = store
            .open(
                Path::new("log.txt"),
                OpenMode::READ | OpenMode::APPEND,
            )
            .expect("open");

        session.seek(SeekFrom::Start(0)).expect("seek");
        session.write(b"def").expect("append");
        assert_eq!(session.tell(), 6);

        session.seek(SeekFrom::Start(0)).expect("rewind");
        let mut buf = [0u8; 8];
        let n = session.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"abcdef");
        session.close().expect("close");
    }

    #[test]
    fn missing_capabilities_are_permissive_noops() {
        let store = cache_with(&[("data.bin", b"1234")]);

        let mut reader = store
            .open(Path::new("data.bin"), OpenMode::read_only())
            .expect("open reader");
        assert_eq!(reader.write(b"nope").expect("write"), 0);
        assert!(!reader.is_dirty());
        reader.close().expect("close");

        let mut writer = store
            .open(Path::new("data.bin"), OpenMode::WRITE)
            .expect("open writer");
        let mut buf = [0u8; 4];
        assert_eq!(writer.read(&mut buf).expect("read"), 0);
        writer.close().expect("close");
    }

    #[test]
    fn seek_rejects_targets_outside_buffer() {
        let store = cache_with(&[("data.bin", b"0123456789")]);
        let mut session = store
            .open(Path::new("data.bin"), OpenMode::read_only())
            .expect("open");

        assert_eq!(session.seek(SeekFrom::End(0)).expect("end"), 10);
        assert_eq!(session.seek(SeekFrom::Start(10)).expect("at end"), 10);
        assert_eq!(session.seek(SeekFrom::Current(-4)).expect("back"), 6);

        assert_eq!(session.seek(SeekFrom::Start(11)), Err(CacheError::OutOfRange));
        assert_eq!(
            session.seek(SeekFrom::Current(-100)),
            Err(CacheError::OutOfRange)
        );
        assert_eq!(session.seek(SeekFrom::End(1)), Err(CacheError::OutOfRange));
        // Failed seeks leave the cursor untouched
        assert_eq!(session.tell(), 6);
        session.close().expect("close");
    }

    #[test]
    fn read_at_end_returns_zero() {
        let store = cache_with(&[("data.bin", b"xy")]);
        let mut session = store
            .open(Path::new("data.bin"), OpenMode::read_only())
            .expect("open");

        let mut buf = [0u8; 8];
        assert_eq!(session.read(&mut buf).expect("read"), 2);
        assert_eq!(session.read(&mut buf).expect("read again"), 0);
        session.close().expect("close");
    }

    #[test]
    fn explicit_flush_persists_while_open() {
        let backing = MemoryStore::new();
        let store = Arc::new(CacheStore::new(
            CacheConfig {
                max_size_bytes: 10_000,
                ..CacheConfig::default()
            },
            backing,
        ));

        let mut session = store
            .open(Path::new("out.txt"), OpenMode::read_write())
            .expect("open");
        session.write(b"first").expect("write");
        session.flush().expect("flush");
        assert!(!session.is_dirty());

        // Continue writing after the flush, then close
        session.write(b" second").expect("write more");
        session.close().expect("close");

        let stats = store.stats();
        assert_eq!(stats.disk_writes, 2);
    }

    #[test]
    fn drop_closes_and_flushes() {
        let store = cache_with(&[]);
        {
            let mut session = store
                .open(Path::new("dropped.txt"), OpenMode::read_write())
                .expect("open");
            session.write(b"persisted").expect("write");
            // Session dropped here without an explicit close
        }
        assert_eq!(store.stats().disk_writes, 1);

        let mut session = store
            .open(Path::new("dropped.txt"), OpenMode::read_only())
            .expect("reopen");
        let mut buf = [0u8; 16];
        let n = session.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"persisted");
        session.close().expect("close");
    }

    #[test]
    fn overwrite_in_place_keeps_length() {
        let store = cache_with(&[("data.bin", b"abcdef")]);
        let mut session = store
            .open(
                Path::new("data.bin"),
                OpenMode::READ | OpenMode::WRITE,
            )
            .expect("open");

        session.seek(SeekFrom::Start(2)).expect("seek");
        session.write(b"XY").expect("write");
        assert_eq!(session.len(), 6);

        session.seek(SeekFrom::Start(0)).expect("rewind");
        let mut buf = [0u8; 8];
        let n = session.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"abXYef");
        session.close().expect("close");
    }
}
