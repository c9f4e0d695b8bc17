//! Blob storage for linkdrop.
//!
//! Blobs live in a namespace keyed by `{owner}/{uuid}.{ext}`. The
//! [`BlobStore`] trait is the seam to the object store; [`LocalBlobStore`]
//! keeps blobs on the local filesystem and signs retrieval links itself.

mod local;
mod signing;

pub use local::LocalBlobStore;
pub use signing::UrlSigner;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Result, ShareError};

/// A time-limited retrieval link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLink {
    /// Credential-free URL.
    pub url: String,
    /// Instant after which the link is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Object store holding entry payloads.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store content under `path`, replacing any existing blob.
    async fn put(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Load a blob. Missing blobs yield [`ShareError::NotFound`].
    async fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Check if a blob exists.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// List the paths of all blobs under a prefix (one namespace level).
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete a blob. Returns `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool>;

    /// Issue a signed retrieval link valid for `validity`.
    async fn signed_url(&self, path: &str, validity: Duration) -> Result<SignedLink>;
}

/// Namespace prefix of an owner's blobs.
///
/// Owner IDs are percent-encoded so that any identity maps to a single
/// path component.
pub fn owner_prefix(owner_id: &str) -> String {
    urlencoding::encode(owner_id).into_owned()
}

/// Generate a collision-resistant blob path keeping the original extension.
pub fn generate_blob_path(owner_id: &str, original_name: &str) -> String {
    let ext = extract_extension(original_name);
    format!("{}/{}.{ext}", owner_prefix(owner_id), Uuid::new_v4())
}

/// Extract the file extension from a filename.
///
/// Returns "bin" if no extension is found.
pub fn extract_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin")
}

/// Reject paths that could escape the namespace.
pub fn validate_blob_path(path: &str) -> Result<()> {
    let valid = !path.is_empty()
        && !path.contains('\\')
        && !path.contains('\0')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(ShareError::Storage(format!("invalid blob path: {path:?}")))
    }
}
