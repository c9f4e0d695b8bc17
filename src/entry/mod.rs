//! Entries: shared files and/or messages.
//!
//! This module provides:
//! - The entry model with its file/message variant
//! - Expiry classification
//! - Listing filters and statistics
//! - The owner-scoped record store

pub mod expiry;
mod model;
mod query;
mod repository;

pub use expiry::ExpiryStatus;
pub use model::{Entry, EntryContent, EntryKind, NewEntry};
pub use query::{EntryOrder, EntryQuery, EntryStats, EntryTotals, StatusFilter, DEFAULT_PAGE_SIZE};
pub use repository::{EntryStore, SqliteEntryStore};

/// Display name of entries without a file.
pub const MESSAGE_ONLY_NAME: &str = "Message";

/// Maximum length for file names (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for messages (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 10_000;
