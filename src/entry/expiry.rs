//! Expiry classification of entries.
//!
//! Expired entries are never removed automatically; they stay listed and are
//! only reported as stale.

use chrono::{DateTime, Utc};

use super::model::Entry;

/// Active/expired state of an entry at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// No expiry, or expiry not yet passed.
    Active,
    /// Expiry instant is in the past.
    Expired,
}

impl ExpiryStatus {
    /// Classify an optional expiry instant against `now`.
    ///
    /// An expiry equal to `now` is still active.
    pub fn of(expiry_date: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expiry_date {
            Some(expiry) if *expiry < now => ExpiryStatus::Expired,
            _ => ExpiryStatus::Active,
        }
    }

    /// Convert to a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Active => "active",
            ExpiryStatus::Expired => "expired",
        }
    }
}

/// Check if an entry is active at `now`.
pub fn is_active(entry: &Entry, now: DateTime<Utc>) -> bool {
    status(entry, now) == ExpiryStatus::Active
}

/// Classify an entry at `now`.
pub fn status(entry: &Entry, now: DateTime<Utc>) -> ExpiryStatus {
    ExpiryStatus::of(entry.expiry_date.as_ref(), now)
}

/// Split entries into `(active, expired)` at `now`, preserving order.
pub fn partition(entries: Vec<Entry>, now: DateTime<Utc>) -> (Vec<Entry>, Vec<Entry>) {
    entries.into_iter().partition(|e| is_active(e, now))
}
