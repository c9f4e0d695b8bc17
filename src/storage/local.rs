//! Filesystem-backed blob store.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::fs;
use url::Url;

use super::signing::UrlSigner;
use super::{validate_blob_path, BlobStore, SignedLink};
use crate::{Result, ShareError};

/// Suffix of files being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Blob store keeping blobs on the local filesystem.
///
/// Blobs are stored one directory per owner:
/// ```text
/// {base_path}/
/// ├── alice/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// └── bob/
///     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// ```
///
/// Retrieval links point at `{public_base_url}/{path}` and carry an
/// `expires` timestamp plus an HMAC `signature` over both.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    public_base_url: Url,
    signer: UrlSigner,
}

fn storage_error(path: &str, e: io::Error) -> ShareError {
    ShareError::Storage(format!("blob {path}: {e}"))
}

impl LocalBlobStore {
    /// Create a new store rooted at `base_path`.
    ///
    /// The base directory is created if it doesn't exist.
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: &str,
        signer: UrlSigner,
    ) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        let public_base_url = Url::parse(public_base_url)
            .map_err(|e| ShareError::Config(format!("invalid public_base_url: {e}")))?;
        if public_base_url.cannot_be_a_base() {
            return Err(ShareError::Config(format!(
                "public_base_url cannot be a base: {public_base_url}"
            )));
        }

        Ok(Self {
            base_path,
            public_base_url,
            signer,
        })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full filesystem path of a blob.
    pub fn file_path(&self, path: &str) -> Result<PathBuf> {
        validate_blob_path(path)?;
        Ok(path
            .split('/')
            .fold(self.base_path.clone(), |acc, segment| acc.join(segment)))
    }

    /// Build the public URL of a blob with the given query parameters.
    fn build_url(&self, path: &str, expires_at: i64, signature: &str) -> Result<String> {
        let mut url = self.public_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ShareError::Config("public_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        url.query_pairs_mut()
            .append_pair("expires", &expires_at.to_string())
            .append_pair("signature", signature);
        Ok(url.into())
    }

    /// Validate a link issued by this store and resolve it to a blob path.
    ///
    /// Fails with [`ShareError::Authorization`] if the link is foreign,
    /// tampered with, or expired at `now`.
    pub fn verify_signed_url(&self, url: &str, now: DateTime<Utc>) -> Result<String> {
        let invalid = |reason: &str| ShareError::Authorization(format!("invalid link: {reason}"));

        let url = Url::parse(url).map_err(|_| invalid("malformed URL"))?;
        if url.origin() != self.public_base_url.origin() {
            return Err(invalid("foreign origin"));
        }

        let base_segments: Vec<&str> = self
            .public_base_url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();
        if segments.len() <= base_segments.len()
            || segments[..base_segments.len()] != base_segments[..]
        {
            return Err(invalid("foreign path"));
        }

        let path = segments[base_segments.len()..]
            .iter()
            .map(|seg| urlencoding::decode(seg).map(|s| s.into_owned()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid("bad path encoding"))?
            .join("/");

        let mut expires_at = None;
        let mut signature = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "expires" => expires_at = value.parse::<i64>().ok(),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }
        let expires_at = expires_at.ok_or_else(|| invalid("missing expiry"))?;
        let signature = signature.ok_or_else(|| invalid("missing signature"))?;

        if !self.signer.verify(&path, expires_at, &signature) {
            return Err(invalid("bad signature"));
        }
        if expires_at < now.timestamp() {
            return Err(ShareError::Authorization("link expired".to_string()));
        }

        Ok(path)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, content: &[u8]) -> Result<()> {
        let file_path = self.file_path(path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(path, e))?;
        }

        // Write under a temporary name so a partial write is never listed.
        let mut partial = file_path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        fs::write(&partial, content)
            .await
            .map_err(|e| storage_error(path, e))?;
        fs::rename(&partial, &file_path)
            .await
            .map_err(|e| storage_error(path, e))?;

        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let file_path = self.file_path(path)?;

        match fs::read(&file_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ShareError::NotFound(format!("blob {path}")))
            }
            Err(e) => Err(storage_error(path, e)),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let file_path = self.file_path(path)?;
        fs::try_exists(&file_path)
            .await
            .map_err(|e| storage_error(path, e))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.file_path(prefix)?;

        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error(prefix, e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| storage_error(prefix, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_file && !name.ends_with(PARTIAL_SUFFIX) {
                paths.push(format!("{prefix}/{name}"));
            }
        }

        paths.sort();
        Ok(paths)
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        let file_path = self.file_path(path)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error(path, e)),
        }
    }

    async fn signed_url(&self, path: &str, validity: Duration) -> Result<SignedLink> {
        validate_blob_path(path)?;

        let validity = chrono::Duration::from_std(validity)
            .map_err(|e| ShareError::Config(format!("invalid link validity: {e}")))?;
        // Whole seconds, so the signed timestamp and `expires_at` agree.
        let expires_ts = Utc::now()
            .checked_add_signed(validity)
            .ok_or_else(|| ShareError::Config("link expiry out of range".to_string()))?
            .timestamp();
        let expires_at = Utc
            .timestamp_opt(expires_ts, 0)
            .single()
            .ok_or_else(|| ShareError::Config("link expiry out of range".to_string()))?;

        let signature = self.signer.sign(path, expires_ts)?;
        let url = self.build_url(path, expires_ts, &signature)?;

        Ok(SignedLink { url, expires_at })
    }
}
