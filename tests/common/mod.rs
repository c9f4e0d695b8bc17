//! Test helpers for workflow tests.
//!
//! Provides fault-injecting wrappers around the real stores and a harness
//! wiring them into a `ShareService`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use linkdrop::entry::EntryTotals;
use linkdrop::storage::SignedLink;
use linkdrop::{
    BlobStore, Database, Entry, EntryStore, LocalBlobStore, NewEntry, Principal, Result,
    ShareError, ShareService, SqliteEntryStore, UrlSigner,
};

/// Base URL used for signed links in tests.
pub const BASE_URL: &str = "https://files.example.com/blobs";

fn injected(what: &str) -> ShareError {
    ShareError::Storage(format!("injected {what} failure"))
}

fn injected_db(what: &str) -> ShareError {
    ShareError::Persistence(format!("injected {what} failure"))
}

/// Blob store that fails selected operations on demand.
pub struct FlakyBlobStore {
    pub inner: LocalBlobStore,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_signed_url: AtomicBool,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FlakyBlobStore {
    pub fn new(inner: LocalBlobStore) -> Self {
        Self {
            inner,
            fail_put: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_signed_url: AtomicBool::new(false),
            put_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, path: &str, content: &[u8]) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(injected("put"));
        }
        self.inner.put(path, content).await
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.get(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        self.inner.delete(path).await
    }

    async fn signed_url(&self, path: &str, validity: Duration) -> Result<SignedLink> {
        if self.fail_signed_url.load(Ordering::SeqCst) {
            return Err(injected("sign"));
        }
        self.inner.signed_url(path, validity).await
    }
}

/// Record store that fails selected operations on demand.
pub struct FlakyEntryStore {
    pub inner: SqliteEntryStore,
    pub fail_insert: AtomicBool,
    pub fail_find: AtomicBool,
    pub fail_increment: AtomicBool,
    pub fail_delete: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl FlakyEntryStore {
    pub fn new(inner: SqliteEntryStore) -> Self {
        Self {
            inner,
            fail_insert: AtomicBool::new(false),
            fail_find: AtomicBool::new(false),
            fail_increment: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EntryStore for FlakyEntryStore {
    async fn insert(&self, entry: &NewEntry) -> Result<Entry> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected_db("insert"));
        }
        self.inner.insert(entry).await
    }

    async fn find(&self, id: &str) -> Result<Option<Entry>> {
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(injected_db("find"));
        }
        self.inner.find(id).await
    }

    async fn list_by_owner(&self, owner_id: &str, search: Option<&str>) -> Result<Vec<Entry>> {
        self.inner.list_by_owner(owner_id, search).await
    }

    async fn blob_paths(&self, owner_id: &str) -> Result<Vec<String>> {
        self.inner.blob_paths(owner_id).await
    }

    async fn increment_downloads(&self, owner_id: &str, id: &str) -> Result<i64> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(injected_db("increment"));
        }
        self.inner.increment_downloads(owner_id, id).await
    }

    async fn increment_views(&self, owner_id: &str, id: &str) -> Result<i64> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(injected_db("increment"));
        }
        self.inner.increment_views(owner_id, id).await
    }

    async fn update_expiry(
        &self,
        owner_id: &str,
        id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        self.inner.update_expiry(owner_id, id, expiry_date).await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected_db("delete"));
        }
        self.inner.delete(owner_id, id).await
    }

    async fn totals(&self, owner_id: &str) -> Result<EntryTotals> {
        self.inner.totals(owner_id).await
    }
}

/// Service wired to fault-injecting stores.
pub struct TestHarness {
    pub db: Database,
    pub temp_dir: TempDir,
    pub blobs: Arc<FlakyBlobStore>,
    pub entries: Arc<FlakyEntryStore>,
    pub service: ShareService,
}

impl TestHarness {
    pub async fn new() -> Self {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let local =
            LocalBlobStore::new(temp_dir.path(), BASE_URL, UrlSigner::new("test-secret")).unwrap();

        let blobs = Arc::new(FlakyBlobStore::new(local));
        let entries = Arc::new(FlakyEntryStore::new(SqliteEntryStore::new(
            db.pool().clone(),
        )));
        let service = ShareService::new(entries.clone(), blobs.clone());

        Self {
            db,
            temp_dir,
            blobs,
            entries,
            service,
        }
    }

    /// All blob paths stored for an owner.
    pub async fn stored_blobs(&self, owner_id: &str) -> Vec<String> {
        self.blobs.inner.list(owner_id).await.unwrap()
    }

    /// Number of records an owner has.
    pub async fn record_count(&self, owner_id: &str) -> usize {
        self.entries
            .inner
            .list_by_owner(owner_id, None)
            .await
            .unwrap()
            .len()
    }
}

pub fn alice() -> Principal {
    Principal::new("alice", "alice@example.com")
}

pub fn bob() -> Principal {
    Principal::new("bob", "bob@example.com")
}
