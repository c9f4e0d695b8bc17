//! HMAC-SHA256 signatures for time-limited blob links.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::{Result, ShareError};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies `(blob path, expiry)` pairs.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl UrlSigner {
    /// Create a signer from a configured secret.
    ///
    /// An empty secret yields a random per-process key, so links do not
    /// survive a restart.
    pub fn new(secret: &str) -> Self {
        if secret.is_empty() {
            Self::random()
        } else {
            Self {
                secret: secret.as_bytes().to_vec(),
            }
        }
    }

    /// Create a signer with a random key.
    pub fn random() -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self {
            secret: secret.into_bytes(),
        }
    }

    /// Length-prefixed message so that `("a/b", 1)` and `("a", ...)` can never collide.
    fn message(path: &str, expires_at: i64) -> String {
        format!("{}:{}\n{}", path.len(), path, expires_at)
    }

    fn mac(&self, path: &str, expires_at: i64) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ShareError::Config(format!("invalid signing key: {e}")))?;
        mac.update(Self::message(path, expires_at).as_bytes());
        Ok(mac)
    }

    /// Hex-encoded signature of a blob path and expiry timestamp (unix seconds).
    pub fn sign(&self, path: &str, expires_at: i64) -> Result<String> {
        let mac = self.mac(path, expires_at)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify a hex-encoded signature in constant time.
    pub fn verify(&self, path: &str, expires_at: i64, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        match self.mac(path, expires_at) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}
