//! Core domain logic for the time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: running and completed sessions
//! - Store: the owned entry collection mirrored to a key-value backend
//! - Statistics: today/week/month totals and the month filter
//! - Time helpers: duration, elapsed and date formatting

pub mod entry;
pub mod stats;
pub mod storage;
pub mod store;
pub mod time;
pub mod types;

pub use entry::{EntryPatch, TimeEntry};
pub use stats::{BucketTotals, Stats, WeekStart, Window, compute_stats, entries_in_month};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use store::{EntryStore, STORAGE_KEY, StoreError, Toggled};
pub use types::{EntryId, ValidationError};
