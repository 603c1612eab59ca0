//! Error types for yourdb
//!
//! Provides a unified error type for all storage operations.

use thiserror::Error;

/// Result type alias using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;

/// Unified error type for yourdb operations
#[derive(Debug, Error)]
pub enum StorageError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Partial Data Errors
    // -------------------------------------------------------------------------
    /// A fixed-width record could not be read in full
    #[error("Failed to read {expected} bytes from disk (got {actual})")]
    ShortRead { expected: usize, actual: usize },

    /// A fixed-width record could not be written in full
    #[error("Failed to write {expected} bytes to disk (wrote {actual})")]
    ShortWrite { expected: usize, actual: usize },

    /// The blob file returned fewer bytes than the index recorded
    #[error("Partial data recovered: expected {expected} bytes, read {actual}")]
    PartialData { expected: u64, actual: u64 },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0} file is closed")]
    Closed(&'static str),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// True for every "fewer bytes than required" condition
    pub fn is_partial_data(&self) -> bool {
        matches!(
            self,
            StorageError::ShortRead { .. }
                | StorageError::ShortWrite { .. }
                | StorageError::PartialData { .. }
        )
    }
}
