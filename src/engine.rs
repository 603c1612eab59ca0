//! Engine Module
//!
//! The storage facade that composes the link index, the metadata record and
//! the blob file into logical object operations.
//!
//! ## Responsibilities
//! - Open (or create) the three backing files together
//! - Route create/read/delete through the components in a fixed order
//! - Close and wipe all three files as a unit

use std::fs;
use std::path::Path;

use crate::blob::BlobStore;
use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::link::Link;
use crate::meta::Meta;

/// The main storage engine
///
/// ## Consistency Model: per-file atomicity only
///
/// - Each component serializes its own operations behind its own lock
/// - No lock spans components: `create` is blob add → link add →
///   meta advance, three separately locked writes
/// - Concurrent creates may interleave differently in each file, but every
///   caller's `(id, offset, length)` stays consistent
/// - A crash between steps leaves the files out of step with each other;
///   nothing here reconciles them on the next open
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Identifier → blob range index
    link: Link,

    /// Allocation cursor and deleted-byte statistic
    meta: Meta,

    /// Raw payload bytes
    blob: BlobStore,
}

/// Point-in-time counters from all three components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Slots in the index, tombstones included
    pub records: u64,

    /// Allocation cursor recorded in the metadata file
    pub end: u64,

    /// Cumulative bytes freed by deletes
    pub deleted_bytes: u64,

    /// Physical length of the blob file
    pub blob_bytes: u64,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the parent directory of the base path if needed
    /// 2. Open the link index
    /// 3. Open (or initialize) the metadata record
    /// 4. Open the blob file
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config.base_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let link = Link::open(&config.link_path(), config.sync_strategy)?;
        let meta = Meta::open(&config.meta_path(), config.sync_strategy)?;
        let blob = BlobStore::open(&config.store_path(), config.sync_strategy)?;

        tracing::debug!(
            base = %config.base_path.display(),
            end = meta.end(),
            deleted = meta.deleted(),
            "engine opened"
        );

        Ok(Self {
            config,
            link,
            meta,
            blob,
        })
    }

    /// Open with a base path (convenience method)
    ///
    /// Uses default config with the specified base filename
    pub fn open_path(base: &Path) -> Result<Self> {
        let config = Config::builder().base_path(base).build();
        Self::open(config)
    }

    /// Store a payload and return its identifier
    pub fn create(&self, data: &[u8]) -> Result<u64> {
        let (offset, length) = self.blob.add(data)?;
        let id = self.link.add(offset, length)?;
        self.meta.advance(length)?;

        tracing::trace!(id, offset, length, "created record");
        Ok(id)
    }

    /// Fetch the payload stored under `id`
    ///
    /// A deleted identifier reads back as an empty payload without error.
    /// So does an identifier created with an empty payload: both are stored
    /// as `length == 0` in the index and cannot be told apart.
    ///
    /// An identifier that was never assigned fails with `ShortRead`.
    pub fn read(&self, id: u64) -> Result<Vec<u8>> {
        let entry = self.link.at(id)?;
        if entry.is_tombstone() {
            return Ok(Vec::new());
        }

        // Check the recorded range against the blob file before allocating
        let blob_len = self.blob.len()?;
        let in_bounds = entry
            .start
            .checked_add(entry.length)
            .is_some_and(|end| end <= blob_len);
        let length = usize::try_from(entry.length)
            .ok()
            .filter(|_| in_bounds)
            .ok_or(StorageError::PartialData {
                expected: entry.length,
                actual: blob_len.saturating_sub(entry.start),
            })?;
        let mut data = vec![0u8; length];

        let read = self.blob.read_at(&mut data, entry.start)?;
        if read != entry.length {
            return Err(StorageError::PartialData {
                expected: entry.length,
                actual: read,
            });
        }

        Ok(data)
    }

    /// Tombstone `id`
    ///
    /// The freed length is added to the deleted-byte statistic; the blob
    /// range itself is never reclaimed.
    pub fn delete(&self, id: u64) -> Result<()> {
        let freed = self.link.delete(id)?;
        if freed > 0 {
            self.meta.mark_deleted(freed)?;
        }

        tracing::trace!(id, freed, "deleted record");
        Ok(())
    }

    /// Close all three files
    ///
    /// Every component is closed even if an earlier one fails; the first
    /// error is returned.
    pub fn close(&self) -> Result<()> {
        let results = [self.blob.close(), self.link.close(), self.meta.close()];
        first_error(results)?;

        tracing::debug!(base = %self.config.base_path.display(), "engine closed");
        Ok(())
    }

    /// Remove all three files from disk
    ///
    /// Call `close()` first; this is not checked. Every removal is attempted
    /// and the first error is returned.
    pub fn wipe(&self) -> Result<()> {
        let results = [
            fs::remove_file(self.blob.path()).map_err(StorageError::from),
            fs::remove_file(self.meta.path()).map_err(StorageError::from),
            fs::remove_file(self.link.path()).map_err(StorageError::from),
        ];
        first_error(results)?;

        tracing::debug!(base = %self.config.base_path.display(), "engine wiped");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Snapshot of the component counters
    pub fn stats(&self) -> Result<EngineStats> {
        let meta = self.meta.state();
        Ok(EngineStats {
            records: self.link.len()?,
            end: meta.end,
            deleted_bytes: meta.deleted,
            blob_bytes: self.blob.len()?,
        })
    }

    /// Get the base path shared by the backing files
    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn first_error<const N: usize>(results: [Result<()>; N]) -> Result<()> {
    results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}
