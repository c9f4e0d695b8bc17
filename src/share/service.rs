//! Share service for linkdrop.
//!
//! This module provides the entry workflows:
//! - Submission with compensating blob cleanup
//! - Signed link issuance with download counting
//! - Deletion keeping blob and record consistent
//! - Listing, statistics and orphan reconciliation

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::request::{guess_content_type, DownloadResult, Preview, SubmitRequest};
use super::validation::{validate_limits, validate_submission};
use crate::auth::{require_owner, Principal};
use crate::config::Config;
use crate::datetime::expiry_after_days;
use crate::entry::{Entry, EntryQuery, EntryStats, EntryStore, NewEntry};
use crate::storage::{generate_blob_path, owner_prefix, BlobStore, SignedLink};
use crate::{Result, ShareError};

/// Default validity window of issued links.
pub const DEFAULT_LINK_VALIDITY: Duration = Duration::from_secs(3600);

/// Default maximum upload size (50MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Service coordinating the record store and the blob store.
///
/// The two stores share no transaction. Every workflow orders its steps so
/// that a failure leaves at worst an unreferenced blob, never a record
/// pointing at missing content.
pub struct ShareService {
    entries: Arc<dyn EntryStore>,
    blobs: Arc<dyn BlobStore>,
    link_validity: Duration,
    max_upload_bytes: u64,
    timezone: String,
}

impl ShareService {
    /// Create a new ShareService with default limits.
    pub fn new(entries: Arc<dyn EntryStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            entries,
            blobs,
            link_validity: DEFAULT_LINK_VALIDITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            timezone: "UTC".to_string(),
        }
    }

    /// Create a ShareService with limits taken from the configuration.
    pub fn from_config(
        config: &Config,
        entries: Arc<dyn EntryStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self::new(entries, blobs)
            .with_link_validity(Duration::from_secs(config.links.validity_secs))
            .with_max_upload_bytes(config.storage.max_upload_bytes())
            .with_timezone(&config.display.timezone)
    }

    /// Set the validity window of issued links.
    pub fn with_link_validity(mut self, validity: Duration) -> Self {
        self.link_validity = validity;
        self
    }

    /// Set the maximum upload size.
    pub fn with_max_upload_bytes(mut self, max_bytes: u64) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }

    /// Set the timezone used when logging expiry dates.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Get the display timezone.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Get the validity window of issued links.
    pub fn link_validity(&self) -> Duration {
        self.link_validity
    }

    /// Get the configured maximum upload size.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Resolve an entry and check that `principal` owns it.
    async fn resolve_owned(&self, principal: &Principal, entry_id: &str) -> Result<Entry> {
        let entry = self
            .entries
            .find(entry_id)
            .await?
            .ok_or_else(|| ShareError::NotFound(format!("entry {entry_id}")))?;

        if let Err(e) = require_owner(principal, &entry.owner_id) {
            warn!(
                principal = %principal.id,
                entry_id,
                "Rejected access to another user's entry"
            );
            return Err(e);
        }

        Ok(entry)
    }

    /// Submit a file and/or message.
    ///
    /// # Steps
    /// 1. Validate; nothing is written on failure.
    /// 2. Store the blob (if any); nothing else is written on failure.
    /// 3. Write the record; on failure the stored blob is deleted again.
    ///
    /// # Returns
    /// The created entry.
    pub async fn submit(&self, principal: &Principal, request: SubmitRequest) -> Result<Entry> {
        validate_submission(request.payload.as_ref(), request.message.as_deref())?;
        validate_limits(&request, self.max_upload_bytes)?;

        let recipient = request
            .recipient_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(principal.email.as_str())
            .to_string();
        let expiry_date = expiry_after_days(Utc::now(), request.expiry_days)?;
        let message = request.message.unwrap_or_default();

        let new_entry = match &request.payload {
            Some(payload) => {
                let blob_path = generate_blob_path(&principal.id, &payload.name);
                self.blobs
                    .put(&blob_path, &payload.content)
                    .await
                    .map_err(|e| match e {
                        ShareError::Storage(_) => e,
                        other => ShareError::Storage(other.to_string()),
                    })?;
                debug!(path = %blob_path, size = payload.size(), "Stored blob");

                NewEntry::file(
                    &principal.id,
                    payload.name.trim(),
                    blob_path,
                    payload.size() as i64,
                    recipient,
                )
                .with_message(message)
            }
            None => NewEntry::message_only(&principal.id, message, recipient),
        }
        .with_expiry(expiry_date);

        let entry = match self.entries.insert(&new_entry).await {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(blob_path) = new_entry.content.blob_path() {
                    self.compensate_blob(blob_path).await;
                }
                return Err(match e {
                    ShareError::Persistence(_) => e,
                    other => ShareError::Persistence(other.to_string()),
                });
            }
        };

        info!(
            owner = %entry.owner_id,
            entry_id = %entry.id,
            kind = %entry.kind(),
            expires = %entry.display_expiry(&self.timezone),
            "Entry submitted"
        );
        Ok(entry)
    }

    /// Delete a blob whose record could not be written.
    async fn compensate_blob(&self, blob_path: &str) {
        match self.blobs.delete(blob_path).await {
            Ok(_) => debug!(path = %blob_path, "Rolled back blob after failed record write"),
            Err(e) => error!(
                path = %blob_path,
                error = %e,
                "Failed to roll back blob; it is now orphaned"
            ),
        }
    }

    /// Issue a time-limited link to an entry's file.
    ///
    /// # Side Effects
    /// Increments the download count. A failed increment is logged and the
    /// link is returned anyway.
    pub async fn issue_link(&self, principal: &Principal, entry_id: &str) -> Result<SignedLink> {
        let entry = self.resolve_owned(principal, entry_id).await?;
        let blob_path = entry.blob_path().ok_or_else(|| {
            ShareError::NotApplicable(format!("entry {entry_id} has no file to link"))
        })?;

        if !self.blobs.exists(blob_path).await? {
            return Err(ShareError::NotFound(format!("blob {blob_path}")));
        }

        let link = self.blobs.signed_url(blob_path, self.link_validity).await?;

        if let Err(e) = self
            .entries
            .increment_downloads(&entry.owner_id, &entry.id)
            .await
        {
            warn!(entry_id, error = %e, "Failed to update download count");
        }

        info!(entry_id, expires_at = %link.expires_at, "Issued link");
        Ok(link)
    }

    /// Fetch an entry's file content.
    ///
    /// # Side Effects
    /// Increments the download count (best effort).
    pub async fn download(&self, principal: &Principal, entry_id: &str) -> Result<DownloadResult> {
        let entry = self.resolve_owned(principal, entry_id).await?;
        let blob_path = entry.blob_path().ok_or_else(|| {
            ShareError::NotApplicable(format!("entry {entry_id} has no file to download"))
        })?;

        let content = self.blobs.get(blob_path).await?;

        if let Err(e) = self
            .entries
            .increment_downloads(&entry.owner_id, &entry.id)
            .await
        {
            warn!(entry_id, error = %e, "Failed to update download count");
        }

        let content_type = guess_content_type(&entry.name);
        Ok(DownloadResult {
            entry,
            content,
            content_type,
        })
    }

    /// Preview an entry: its message and, for file entries, the content.
    ///
    /// # Side Effects
    /// Increments the view count (best effort).
    pub async fn preview(&self, principal: &Principal, entry_id: &str) -> Result<Preview> {
        let entry = self.resolve_owned(principal, entry_id).await?;

        let (content, content_type) = match entry.blob_path() {
            Some(blob_path) => (
                Some(self.blobs.get(blob_path).await?),
                Some(guess_content_type(&entry.name)),
            ),
            None => (None, None),
        };

        if let Err(e) = self.entries.increment_views(&entry.owner_id, &entry.id).await {
            warn!(entry_id, error = %e, "Failed to update view count");
        }

        Ok(Preview {
            entry,
            content,
            content_type,
        })
    }

    /// Get an entry.
    pub async fn get(&self, principal: &Principal, entry_id: &str) -> Result<Entry> {
        self.resolve_owned(principal, entry_id).await
    }

    /// Delete an entry and its blob.
    ///
    /// The blob goes first; if that fails the record is left untouched. A
    /// blob that is already gone counts as deleted.
    pub async fn delete(&self, principal: &Principal, entry_id: &str) -> Result<()> {
        let entry = self.resolve_owned(principal, entry_id).await?;

        if let Some(blob_path) = entry.blob_path() {
            match self.blobs.delete(blob_path).await {
                Ok(true) => debug!(path = %blob_path, "Deleted blob"),
                Ok(false) => debug!(path = %blob_path, "Blob already missing"),
                Err(e) => {
                    warn!(entry_id, error = %e, "Blob delete failed; keeping record");
                    return Err(match e {
                        ShareError::Storage(_) => e,
                        other => ShareError::Storage(other.to_string()),
                    });
                }
            }
        }

        let deleted = self
            .entries
            .delete(&entry.owner_id, &entry.id)
            .await
            .map_err(|e| match e {
                ShareError::Persistence(_) => e,
                other => ShareError::Persistence(other.to_string()),
            })?;
        if !deleted {
            return Err(ShareError::NotFound(format!("entry {entry_id}")));
        }

        info!(owner = %entry.owner_id, entry_id, "Entry deleted");
        Ok(())
    }

    /// Reset an entry's expiry to `days` from now; `0` removes the expiry.
    pub async fn update_expiry(
        &self,
        principal: &Principal,
        entry_id: &str,
        days: u32,
    ) -> Result<Entry> {
        let entry = self.resolve_owned(principal, entry_id).await?;
        let expiry_date = expiry_after_days(Utc::now(), days)?;

        if !self
            .entries
            .update_expiry(&entry.owner_id, &entry.id, expiry_date)
            .await?
        {
            return Err(ShareError::NotFound(format!("entry {entry_id}")));
        }

        let entry = Entry {
            expiry_date,
            ..entry
        };
        info!(
            entry_id,
            expires = %entry.display_expiry(&self.timezone),
            "Expiry updated"
        );
        Ok(entry)
    }

    /// List the principal's entries.
    pub async fn list(&self, principal: &Principal, query: &EntryQuery) -> Result<Vec<Entry>> {
        let entries = self
            .entries
            .list_by_owner(&principal.id, query.search.as_deref())
            .await?;
        Ok(query.apply(entries, Utc::now()))
    }

    /// Dashboard statistics for the principal.
    pub async fn stats(&self, principal: &Principal) -> Result<EntryStats> {
        let totals = self.entries.totals(&principal.id).await?;
        let entries = self.entries.list_by_owner(&principal.id, None).await?;
        Ok(EntryStats::from_totals(totals, &entries, Utc::now()))
    }

    /// Blobs in the principal's namespace that no record references.
    ///
    /// These come from submissions abandoned between the blob write and the
    /// record write, or from failed rollbacks.
    pub async fn find_orphaned_blobs(&self, principal: &Principal) -> Result<Vec<String>> {
        let referenced: HashSet<String> = self
            .entries
            .blob_paths(&principal.id)
            .await?
            .into_iter()
            .collect();

        let stored = self.blobs.list(&owner_prefix(&principal.id)).await?;
        Ok(stored
            .into_iter()
            .filter(|path| !referenced.contains(path))
            .collect())
    }

    /// Delete the principal's orphaned blobs. Returns how many were removed.
    ///
    /// Must not run while a submission by the same principal is in flight:
    /// its blob would look orphaned until the record is written.
    pub async fn sweep_orphaned_blobs(&self, principal: &Principal) -> Result<usize> {
        let orphans = self.find_orphaned_blobs(principal).await?;

        let mut removed = 0;
        for path in &orphans {
            if self.blobs.delete(path).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(owner = %principal.id, removed, "Swept orphaned blobs");
        }
        Ok(removed)
    }
}
