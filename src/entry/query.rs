//! Listing filters, ordering and statistics for entries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::expiry::{self, ExpiryStatus};
use super::model::{Entry, EntryKind};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Status filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every entry.
    #[default]
    All,
    /// Only entries that have not expired.
    Active,
    /// Only expired entries.
    Expired,
}

impl StatusFilter {
    fn matches(&self, status: ExpiryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ExpiryStatus::Active,
            StatusFilter::Expired => status == ExpiryStatus::Expired,
        }
    }
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryOrder {
    /// Newest first.
    #[default]
    NewestFirst,
    /// Oldest first.
    OldestFirst,
    /// Name, case-insensitive ascending.
    Name,
    /// Soonest expiry first; entries without expiry last.
    ExpiringSoonest,
    /// Most downloaded first.
    MostDownloaded,
}

/// Listing request.
#[derive(Debug, Clone)]
pub struct EntryQuery {
    /// Case-insensitive substring matched against name and message.
    pub search: Option<String>,
    /// Status filter.
    pub status: StatusFilter,
    /// Kind filter.
    pub kind: Option<EntryKind>,
    /// Sort order.
    pub order: EntryOrder,
    /// Maximum number of entries returned.
    pub limit: usize,
    /// Number of entries skipped.
    pub offset: usize,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: StatusFilter::All,
            kind: None,
            order: EntryOrder::NewestFirst,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl EntryQuery {
    /// Create a query with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text. Blank text clears the search.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        };
        self
    }

    /// Set the status filter.
    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Set the kind filter.
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the sort order.
    pub fn order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    /// Set pagination.
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Apply status/kind filters, ordering and pagination.
    ///
    /// Search is expected to have been applied by the store.
    pub fn apply(&self, entries: Vec<Entry>, now: DateTime<Utc>) -> Vec<Entry> {
        let mut entries: Vec<Entry> = entries
            .into_iter()
            .filter(|e| self.status.matches(expiry::status(e, now)))
            .filter(|e| self.kind.map_or(true, |k| e.kind() == k))
            .collect();

        entries.sort_by(|a, b| compare(self.order, a, b));

        entries
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

fn compare(order: EntryOrder, a: &Entry, b: &Entry) -> Ordering {
    let primary = match order {
        EntryOrder::NewestFirst => b.created_at.cmp(&a.created_at),
        EntryOrder::OldestFirst => a.created_at.cmp(&b.created_at),
        EntryOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        EntryOrder::ExpiringSoonest => match (&a.expiry_date, &b.expiry_date) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        EntryOrder::MostDownloaded => b.download_count.cmp(&a.download_count),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Aggregates computed by the record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct EntryTotals {
    /// Number of entries.
    pub entries: i64,
    /// Number of entries with a file.
    pub file_entries: i64,
    /// Sum of download counters.
    pub downloads: i64,
    /// Sum of view counters.
    pub views: i64,
    /// Sum of payload sizes.
    pub bytes: i64,
}

/// Per-owner dashboard statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    /// Number of entries.
    pub total: i64,
    /// Entries not yet expired.
    pub active: i64,
    /// Expired entries.
    pub expired: i64,
    /// Entries with a file.
    pub file_entries: i64,
    /// Entries with only a message.
    pub message_entries: i64,
    /// Sum of download counters.
    pub total_downloads: i64,
    /// Sum of view counters.
    pub total_views: i64,
    /// Sum of payload sizes in bytes.
    pub total_bytes: i64,
}

impl EntryStats {
    /// Combine store totals with expiry classification of the owner's entries.
    pub fn from_totals(totals: EntryTotals, entries: &[Entry], now: DateTime<Utc>) -> Self {
        let active = entries.iter().filter(|e| expiry::is_active(e, now)).count() as i64;
        Self {
            total: totals.entries,
            active,
            expired: totals.entries - active,
            file_entries: totals.file_entries,
            message_entries: totals.entries - totals.file_entries,
            total_downloads: totals.downloads,
            total_views: totals.views,
            total_bytes: totals.bytes,
        }
    }
}
