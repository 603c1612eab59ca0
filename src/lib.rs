//! # yourdb
//!
//! A minimal persistent object store:
//! - Opaque byte payloads in, dense 64-bit identifiers out
//! - Three backing files: an index, a metadata record, a blob file
//! - Tombstone deletes with a deleted-byte statistic (no reclamation)
//! - Per-file locking for concurrent callers within one process
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                              │
//! │          create / read / delete / close / wipe              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!        ┌──────────────┼──────────────────┐
//!        │ 1            │ 2                │ 3
//!        ▼              ▼                  ▼
//! ┌─────────────┐ ┌─────────────┐   ┌─────────────┐
//! │  BlobStore  │ │    Link     │   │    Meta     │
//! │  (.store)   │ │   (.link)   │   │   (.meta)   │
//! │ raw payload │ │ id → range  │   │ end/deleted │
//! └─────────────┘ └─────────────┘   └─────────────┘
//! ```
//!
//! Writes go blob → link → meta, each under its own lock. The combined
//! operation is not atomic across files.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod blob;
pub mod link;
pub mod meta;
pub mod engine;

mod file;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StorageError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{Engine, EngineStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of yourdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
