//! Open-mode capability flags
//!
//! A session is opened with a capability set instead of an fopen-style mode
//! string. Reads on a session without [`OpenMode::READ`] and writes on a
//! session without [`OpenMode::WRITE`]/[`OpenMode::APPEND`] are permissive
//! no-ops returning zero bytes, matching classic buffered-handle behavior.

use bitflags::bitflags;

bitflags! {
    /// Capability set a session is opened with
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u8 {
        /// Permit reads from the cached buffer
        const READ = 0b0001;
        /// Permit writes at the cursor position
        const WRITE = 0b0010;
        /// Permit writes forced to the end of the buffer
        const APPEND = 0b0100;
        /// On a miss, start from an empty entry without touching the
        /// backing store; a stored object is replaced on write-back
        const CREATE = 0b1000;
    }
}

impl OpenMode {
    /// Read-only access to an existing object
    #[inline(always)]
    pub fn read_only() -> Self {
        Self::READ
    }

    /// Read/write access; a cold open starts from an empty buffer
    #[inline(always)]
    pub fn read_write() -> Self {
        Self::READ | Self::WRITE | Self::CREATE
    }

    /// Truncating write access: a cold open starts empty and write-back
    /// replaces whatever the backing store holds
    #[inline(always)]
    pub fn write_only() -> Self {
        Self::WRITE | Self::CREATE
    }

    /// Append access to an existing object
    #[inline(always)]
    pub fn append() -> Self {
        Self::APPEND
    }

    /// Check whether this mode carries any write capability
    #[inline(always)]
    pub fn is_writer(&self) -> bool {
        self.intersects(Self::WRITE | Self::APPEND)
    }
}
