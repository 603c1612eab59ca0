//! Link entry definitions
//!
//! Defines the 16-byte index slot and its big-endian codec.

use bytes::{Buf, BufMut};

/// Size of one index slot in bytes
pub const ENTRY_SIZE: usize = 16;

/// Byte offset of the length field inside a slot
pub(crate) const LENGTH_OFFSET: u64 = 8;

/// Size of the length field in bytes
pub(crate) const LENGTH_SIZE: usize = 8;

/// A single slot in the index file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkEntry {
    /// Offset of the payload in the blob file
    pub start: u64,

    /// Payload length in bytes; 0 marks a tombstone
    pub length: u64,
}

impl LinkEntry {
    /// The zeroed slot written by a delete
    pub const TOMBSTONE: LinkEntry = LinkEntry { start: 0, length: 0 };

    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// True when the slot was deleted (or holds an empty payload)
    pub fn is_tombstone(&self) -> bool {
        self.length == 0
    }

    /// Encode as `[start (8, BE)][length (8, BE)]`
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        let mut buf = &mut out[..];
        buf.put_u64(self.start);
        buf.put_u64(self.length);
        out
    }

    pub fn decode(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut buf = &bytes[..];
        let start = buf.get_u64();
        let length = buf.get_u64();
        Self { start, length }
    }
}

impl From<LinkEntry> for (u64, u64) {
    fn from(entry: LinkEntry) -> Self {
        (entry.start, entry.length)
    }
}
