//! Meta tracker
//!
//! Loads, mutates and persists the `MetaState` record.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{Result, StorageError};
use crate::file;

use super::{MetaState, STATE_SIZE};

const NAME: &str = "meta";

/// Metadata file tracking allocation progress
///
/// The in-memory state is only updated after the new record has been
/// written, so a failed persist leaves `end`/`deleted` where they were.
pub struct Meta {
    path: PathBuf,
    inner: Mutex<MetaInner>,
    sync_strategy: SyncStrategy,
}

struct MetaInner {
    file: Option<File>,
    state: MetaState,
}

impl Meta {
    /// Open or create the metadata file
    ///
    /// An empty or undecodable file is not an error: the state is reset to
    /// zero and written out. Only a failure of that write is fatal.
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let mut file = file::open_or_create(path)?;

        let state = match Self::load(&mut file) {
            Ok(state) => {
                tracing::debug!(path = %path.display(), end = state.end, deleted = state.deleted, "loaded meta");
                state
            }
            Err(e) => {
                tracing::info!(path = %path.display(), reason = %e, "initializing fresh meta");
                let state = MetaState::default();
                Self::save(&mut file, &state, sync_strategy)?;
                state
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(MetaInner {
                file: Some(file),
                state,
            }),
            sync_strategy,
        })
    }

    /// Reserve `n` bytes and return the offset they start at
    pub fn advance(&self, n: u64) -> Result<u64> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let file = file::handle(&mut inner.file, NAME)?;

        let pos = inner.state.end;
        let end = pos.checked_add(n).ok_or_else(|| {
            StorageError::Storage(format!("allocation cursor overflow: {} + {}", pos, n))
        })?;
        let next = MetaState { end, ..inner.state };

        Self::save(file, &next, self.sync_strategy)?;
        inner.state = next;

        tracing::trace!(pos, n, end, "meta advance");
        Ok(pos)
    }

    /// Add `n` freed bytes to the statistic and return the new total
    ///
    /// `mark_deleted(0)` reads the total without touching the file.
    pub fn mark_deleted(&self, n: u64) -> Result<u64> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let file = file::handle(&mut inner.file, NAME)?;

        let total = inner.state.deleted.checked_add(n).ok_or_else(|| {
            StorageError::Storage(format!(
                "deleted byte counter overflow: {} + {}",
                inner.state.deleted, n
            ))
        })?;

        if n > 0 {
            let next = MetaState {
                deleted: total,
                ..inner.state
            };
            Self::save(file, &next, self.sync_strategy)?;
            inner.state = next;
            tracing::trace!(n, total, "meta mark_deleted");
        }

        Ok(total)
    }

    /// Current allocation cursor
    pub fn end(&self) -> u64 {
        self.inner.lock().state.end
    }

    /// Current deleted-byte total
    pub fn deleted(&self) -> u64 {
        self.inner.lock().state.deleted
    }

    pub fn state(&self) -> MetaState {
        self.inner.lock().state
    }

    /// Sync and release the file handle
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        file::close(&mut guard.file, NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn load(file: &mut File) -> Result<MetaState> {
        file.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; STATE_SIZE];
        let read = file::read_full(file, &mut buf)?;
        if read != STATE_SIZE {
            return Err(StorageError::ShortRead {
                expected: STATE_SIZE,
                actual: read,
            });
        }
        MetaState::decode(&buf)
    }

    /// Overwrite the record from offset 0
    fn save(file: &mut File, state: &MetaState, sync_strategy: SyncStrategy) -> Result<()> {
        let bytes = state.encode()?;

        file.seek(SeekFrom::Start(0))?;
        let written = file::write_full(file, &bytes)?;
        if written != bytes.len() {
            return Err(StorageError::ShortWrite {
                expected: bytes.len(),
                actual: written,
            });
        }
        if sync_strategy.sync_on_write() {
            file.sync_data()?;
        }
        Ok(())
    }
}
