//! Link Module
//!
//! Fixed-width index mapping record identifiers to byte ranges in the
//! blob file.
//!
//! ## Responsibilities
//! - Assign dense, monotonically increasing identifiers
//! - Resolve an identifier to its `(start, length)` range
//! - Tombstone deleted identifiers by zeroing their slot
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────┐
//! │ Slot 0            (offset 0)        │
//! │ ┌─────────────────┬───────────────┐ │
//! │ │ Start (8, BE)   │ Length (8, BE)│ │
//! │ └─────────────────┴───────────────┘ │
//! ├─────────────────────────────────────┤
//! │ Slot 1            (offset 16)       │
//! │ ┌─────────────────┬───────────────┐ │
//! │ │ Start (8, BE)   │ Length (8, BE)│ │
//! │ └─────────────────┴───────────────┘ │
//! └─────────────────────────────────────┘
//! ```
//!
//! There is no header. Slot `id` lives at byte offset `id × 16`, and a
//! slot with `length == 0` is either deleted or holds an empty payload;
//! the two cannot be told apart.

mod entry;
mod index;

pub use entry::{LinkEntry, ENTRY_SIZE};
pub use index::Link;
