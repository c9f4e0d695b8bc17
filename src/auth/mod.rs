//! Principal context and ownership checks.
//!
//! Session lifecycle belongs to the identity provider; workflows only
//! receive the already authenticated [`Principal`].

use crate::{Result, ShareError};

/// An authenticated user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Identity provider's user id.
    pub id: String,
    /// Email address of the user.
    pub email: String,
}

impl Principal {
    /// Create a new principal.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Check if this principal owns a resource.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.id == owner_id
    }
}

/// Require that `principal` owns the resource identified by `owner_id`.
pub fn require_owner(principal: &Principal, owner_id: &str) -> Result<()> {
    if principal.owns(owner_id) {
        Ok(())
    } else {
        Err(ShareError::Authorization(
            "entry belongs to another user".to_string(),
        ))
    }
}

/// Check that a string looks like an email address (`local@domain.tld`).
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
