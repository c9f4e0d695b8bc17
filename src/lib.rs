//! linkdrop - share files and short messages through expiring links.
//!
//! Entries are stored as records in an owner-scoped record store, with file
//! payloads in a separate blob store. The [`ShareService`] keeps the two
//! consistent without a shared transaction.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod entry;
pub mod error;
pub mod logging;
pub mod share;
pub mod storage;

pub use auth::Principal;
pub use config::Config;
pub use db::Database;
pub use entry::{
    Entry, EntryContent, EntryKind, EntryOrder, EntryQuery, EntryStats, EntryStore,
    ExpiryStatus, NewEntry, SqliteEntryStore, StatusFilter,
};
pub use error::{Result, ShareError};
pub use share::{DownloadResult, Payload, Preview, ShareService, SubmitRequest};
pub use storage::{BlobStore, LocalBlobStore, SignedLink, UrlSigner};
