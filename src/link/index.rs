//! Link index
//!
//! Appends, resolves and tombstones fixed-width slots in the index file.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{Result, StorageError};
use crate::file;

use super::entry::{LENGTH_OFFSET, LENGTH_SIZE};
use super::{LinkEntry, ENTRY_SIZE};

const NAME: &str = "link";

/// Index file mapping identifiers to blob ranges
///
/// ## Concurrency:
/// - `file`: every operation holds the mutex for its whole seek/read/write
///   sequence, so `add` observes a unique end-of-file per caller
/// - `None` once closed
pub struct Link {
    path: PathBuf,
    file: Mutex<Option<File>>,
    sync_strategy: SyncStrategy,
}

impl Link {
    /// Open or create the index file
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = file::open_or_create(path)?;

        let size = file.metadata()?.len();
        if size % ENTRY_SIZE as u64 != 0 {
            tracing::warn!(
                path = %path.display(),
                size,
                "index file length is not a multiple of the slot size"
            );
        }
        tracing::debug!(path = %path.display(), slots = size / ENTRY_SIZE as u64, "opened link");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
            sync_strategy,
        })
    }

    /// Resolve an identifier to its blob range
    ///
    /// Fails with `ShortRead` when the slot was never written.
    pub fn at(&self, id: u64) -> Result<LinkEntry> {
        let offset = Self::slot_offset(id, ENTRY_SIZE)?;

        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;

        // Never seek past end-of-file: offsets beyond the filesystem's size
        // limit fail the seek itself rather than reading short
        if offset >= file.metadata()?.len() {
            return Err(StorageError::ShortRead {
                expected: ENTRY_SIZE,
                actual: 0,
            });
        }
        file.seek(SeekFrom::Start(offset))?;
        let mut slot = [0u8; ENTRY_SIZE];
        let read = file::read_full(file, &mut slot)?;
        if read != ENTRY_SIZE {
            return Err(StorageError::ShortRead {
                expected: ENTRY_SIZE,
                actual: read,
            });
        }

        Ok(LinkEntry::decode(&slot))
    }

    /// Append a slot and return its identifier
    ///
    /// The identifier is the slot count before the write, derived from the
    /// file size rather than a counter kept in memory.
    pub fn add(&self, start: u64, length: u64) -> Result<u64> {
        let slot = LinkEntry::new(start, length).encode();

        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;

        let pos = file.seek(SeekFrom::End(0))?;
        let written = file::write_full(file, &slot)?;
        if written != ENTRY_SIZE {
            return Err(StorageError::ShortWrite {
                expected: ENTRY_SIZE,
                actual: written,
            });
        }
        if self.sync_strategy.sync_on_write() {
            file.sync_data()?;
        }

        let id = pos / ENTRY_SIZE as u64;
        tracing::trace!(id, start, length, "link add");
        Ok(id)
    }

    /// Zero the slot and return the length it held
    ///
    /// Deleting a slot twice is not an error; the second call frees 0 bytes.
    pub fn delete(&self, id: u64) -> Result<u64> {
        let offset = Self::slot_offset(id, LENGTH_SIZE)?;

        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;

        if offset + LENGTH_OFFSET >= file.metadata()?.len() {
            return Err(StorageError::ShortRead {
                expected: LENGTH_SIZE,
                actual: 0,
            });
        }
        file.seek(SeekFrom::Start(offset + LENGTH_OFFSET))?;
        let mut length = [0u8; LENGTH_SIZE];
        let read = file::read_full(file, &mut length)?;
        if read != LENGTH_SIZE {
            return Err(StorageError::ShortRead {
                expected: LENGTH_SIZE,
                actual: read,
            });
        }
        let freed = u64::from_be_bytes(length);

        file.seek(SeekFrom::Start(offset))?;
        let written = file::write_full(file, &LinkEntry::TOMBSTONE.encode())?;
        if written != ENTRY_SIZE {
            return Err(StorageError::ShortWrite {
                expected: ENTRY_SIZE,
                actual: written,
            });
        }
        if self.sync_strategy.sync_on_write() {
            file.sync_data()?;
        }

        tracing::trace!(id, freed, "link delete");
        Ok(freed)
    }

    /// Number of slots in the file, including tombstones
    pub fn len(&self) -> Result<u64> {
        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;
        Ok(file.metadata()?.len() / ENTRY_SIZE as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Sync and release the file handle
    pub fn close(&self) -> Result<()> {
        let mut guard = self.file.lock();
        file::close(&mut guard, NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Byte offset of slot `id`, or `ShortRead` if it cannot exist
    ///
    /// The slot must end at or below `i64::MAX`, the largest offset a seek
    /// accepts.
    fn slot_offset(id: u64, expected: usize) -> Result<u64> {
        id.checked_mul(ENTRY_SIZE as u64)
            .filter(|offset| {
                offset
                    .checked_add(ENTRY_SIZE as u64)
                    .is_some_and(|end| i64::try_from(end).is_ok())
            })
            .ok_or(StorageError::ShortRead {
                expected,
                actual: 0,
            })
    }
}
