//! Meta state definitions

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Encoded size of a `MetaState` (two fixed-width u64 fields)
pub const STATE_SIZE: usize = 16;

/// The single persisted metadata record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaState {
    /// Cumulative bytes freed by deletes
    pub deleted: u64,

    /// Next write offset into the blob file
    pub end: u64,
}

impl MetaState {
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Decode the first `STATE_SIZE` bytes
    ///
    /// Only input shorter than `STATE_SIZE` is rejected. The encoding has no
    /// magic or checksum, so any 16 bytes decode into some pair of counters.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
