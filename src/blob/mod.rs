//! Blob Module
//!
//! Append-only file of raw payload bytes.
//!
//! Payloads are concatenated with no framing; the link index is the only
//! record of where one payload ends and the next begins. Deleted ranges stay
//! in the file as dead space.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{Result, StorageError};
use crate::file;

const NAME: &str = "store";

/// Raw payload file addressed by externally tracked `(offset, length)`
pub struct BlobStore {
    path: PathBuf,
    file: Mutex<Option<File>>,
    sync_strategy: SyncStrategy,
}

impl BlobStore {
    /// Open or create the blob file
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = file::open_or_create(path)?;
        tracing::debug!(path = %path.display(), bytes = file.metadata()?.len(), "opened blob store");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(Some(file)),
            sync_strategy,
        })
    }

    /// Append `data`; returns `(offset, length)` of the written range
    pub fn add(&self, data: &[u8]) -> Result<(u64, u64)> {
        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;

        let offset = file.seek(SeekFrom::End(0))?;
        let written = file::write_full(file, data)?;
        if written != data.len() {
            return Err(StorageError::ShortWrite {
                expected: data.len(),
                actual: written,
            });
        }
        if self.sync_strategy.sync_on_write() {
            file.sync_data()?;
        }

        tracing::trace!(offset, length = written, "blob add");
        Ok((offset, written as u64))
    }

    /// Read into `buf` starting at `offset`
    ///
    /// Returns the byte count actually read, which is short when the file
    /// ends early. Callers validate the count.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<u64> {
        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;

        if offset >= file.metadata()?.len() {
            return Ok(0);
        }
        file.seek(SeekFrom::Start(offset))?;
        let read = file::read_full(file, buf)?;
        Ok(read as u64)
    }

    /// Current file length in bytes, dead space included
    pub fn len(&self) -> Result<u64> {
        let mut guard = self.file.lock();
        let file = file::handle(&mut guard, NAME)?;
        Ok(file.metadata()?.len())
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
}
