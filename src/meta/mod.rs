//! Meta Module
//!
//! Persists the allocation cursor and the deleted-byte statistic.
//!
//! ## Responsibilities
//! - Hand out the next write offset into the blob file
//! - Accumulate bytes freed by deletes (informational only, nothing is
//!   reclaimed)
//! - Self-initialize when the file is empty or unreadable
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────┐
//! │ MetaState (bincode, offset 0)    │
//! │ ┌───────────────┬──────────────┐ │
//! │ │ Deleted (8)   │ End (8)      │ │
//! │ └───────────────┴──────────────┘ │
//! └──────────────────────────────────┘
//! ```
//!
//! Only a file shorter than 16 bytes counts as malformed and triggers
//! re-initialization; 16 or more bytes of garbage decode as counters.
//!
//! The whole record is rewritten on every mutation. A torn write during
//! `advance` can therefore damage `deleted` as well as `end`.

mod state;
mod tracker;

pub use state::{MetaState, STATE_SIZE};
pub use tracker::Meta;
