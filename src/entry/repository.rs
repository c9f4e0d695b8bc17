//! Record store for entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::{Entry, EntryContent, EntryKind, NewEntry};
use super::query::EntryTotals;
use crate::{Result, ShareError};

/// Record store for entries.
///
/// Every read and mutation except [`EntryStore::find`] is scoped to an owner.
/// `find` exists only so callers can tell "missing" apart from "not yours".
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry. The store assigns `id` and `created_at`.
    async fn insert(&self, entry: &NewEntry) -> Result<Entry>;

    /// Resolve an entry by ID regardless of owner.
    async fn find(&self, id: &str) -> Result<Option<Entry>>;

    /// List an owner's entries, optionally filtered by a case-insensitive
    /// substring of name or message.
    async fn list_by_owner(&self, owner_id: &str, search: Option<&str>) -> Result<Vec<Entry>>;

    /// Blob paths referenced by an owner's entries.
    async fn blob_paths(&self, owner_id: &str) -> Result<Vec<String>>;

    /// Increment the download counter. Returns the new value.
    async fn increment_downloads(&self, owner_id: &str, id: &str) -> Result<i64>;

    /// Increment the view counter. Returns the new value.
    async fn increment_views(&self, owner_id: &str, id: &str) -> Result<i64>;

    /// Replace the expiry instant. Returns `false` if no row matched.
    async fn update_expiry(
        &self,
        owner_id: &str,
        id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    /// Delete an entry. Returns `false` if no row matched.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool>;

    /// Aggregate counters for an owner.
    async fn totals(&self, owner_id: &str) -> Result<EntryTotals>;
}

const SELECT_COLUMNS: &str = "SELECT id, owner_id, name, kind, blob_path, message, recipient_email,
        expiry_date, created_at, download_count, view_count, size
 FROM entries";

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    owner_id: String,
    name: String,
    kind: String,
    blob_path: Option<String>,
    message: Option<String>,
    recipient_email: String,
    expiry_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    download_count: i64,
    view_count: i64,
    size: i64,
}

impl TryFrom<EntryRow> for Entry {
    type Error = ShareError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let stored_kind = EntryKind::parse(&row.kind).ok_or_else(|| {
            ShareError::Persistence(format!("entry {} has unknown kind {}", row.id, row.kind))
        })?;
        let content = EntryContent::from_parts(row.blob_path, row.message).map_err(|_| {
            ShareError::Persistence(format!("entry {} has neither file nor message", row.id))
        })?;
        if content.kind() != stored_kind {
            return Err(ShareError::Persistence(format!(
                "entry {} is stored as {} but has kind {}",
                row.id,
                stored_kind,
                content.kind()
            )));
        }

        Ok(Entry {
            id: row.id,
            name: row.name,
            content,
            recipient_email: row.recipient_email,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
            download_count: row.download_count,
            view_count: row.view_count,
            owner_id: row.owner_id,
            size: row.size,
        })
    }
}

/// Escape `%`, `_` and `\` for a LIKE pattern using `\` as escape character.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// SQLite-backed entry store.
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    /// Create a new store on the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn increment_column(&self, column: &str, owner_id: &str, id: &str) -> Result<i64> {
        let sql = format!(
            "UPDATE entries SET {column} = {column} + 1
             WHERE id = ? AND owner_id = ?
             RETURNING {column}"
        );
        let value: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        value.ok_or_else(|| ShareError::NotFound(format!("entry {id}")))
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn insert(&self, entry: &NewEntry) -> Result<Entry> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO entries (id, owner_id, name, kind, blob_path, message, recipient_email,
                                  expiry_date, created_at, size)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.owner_id)
        .bind(&entry.name)
        .bind(entry.content.kind().as_str())
        .bind(entry.content.blob_path())
        .bind(entry.content.message())
        .bind(&entry.recipient_email)
        .bind(entry.expiry_date)
        .bind(created_at)
        .bind(entry.size)
        .execute(&self.pool)
        .await?;

        // The row is committed; no fallible step may follow.
        Ok(Entry {
            id,
            name: entry.name.clone(),
            content: entry.content.clone(),
            recipient_email: entry.recipient_email.clone(),
            expiry_date: entry.expiry_date,
            created_at,
            download_count: 0,
            view_count: 0,
            owner_id: entry.owner_id.clone(),
            size: entry.size,
        })
    }

    async fn find(&self, id: &str) -> Result<Option<Entry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Entry::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str, search: Option<&str>) -> Result<Vec<Entry>> {
        let rows = match search {
            Some(text) => {
                let pattern = like_pattern(text);
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE owner_id = ?
                       AND (name LIKE ? ESCAPE '\\' OR message LIKE ? ESCAPE '\\')
                     ORDER BY created_at DESC, id"
                );
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(owner_id)
                    .bind(&pattern)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ? ORDER BY created_at DESC, id");
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn blob_paths(&self, owner_id: &str) -> Result<Vec<String>> {
        let paths: Vec<String> = sqlx::query_scalar(
            "SELECT blob_path FROM entries WHERE owner_id = ? AND blob_path IS NOT NULL",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(paths)
    }

    async fn increment_downloads(&self, owner_id: &str, id: &str) -> Result<i64> {
        self.increment_column("download_count", owner_id, id).await
    }

    async fn increment_views(&self, owner_id: &str, id: &str) -> Result<i64> {
        self.increment_column("view_count", owner_id, id).await
    }

    async fn update_expiry(
        &self,
        owner_id: &str,
        id: &str,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE entries SET expiry_date = ? WHERE id = ? AND owner_id = ?")
            .bind(expiry_date)
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn totals(&self, owner_id: &str) -> Result<EntryTotals> {
        let totals = sqlx::query_as::<_, EntryTotals>(
            "SELECT COUNT(*) AS entries,
                    COALESCE(SUM(CASE WHEN blob_path IS NOT NULL THEN 1 ELSE 0 END), 0) AS file_entries,
                    COALESCE(SUM(download_count), 0) AS downloads,
                    COALESCE(SUM(view_count), 0) AS views,
                    COALESCE(SUM(size), 0) AS bytes
             FROM entries WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}
