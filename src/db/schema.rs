//! Database schema and migrations for linkdrop.
//!
//! Migrations are applied in order; the `schema_version` table records
//! which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Entries table
    r#"
CREATE TABLE entries (
    id              TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL,
    name            TEXT NOT NULL,
    kind            TEXT NOT NULL,                -- 'file_and_message' or 'message_only'
    blob_path       TEXT UNIQUE,                  -- NULL for message-only entries
    message         TEXT,
    recipient_email TEXT NOT NULL,
    expiry_date     TEXT,                         -- NULL never expires
    created_at      TEXT NOT NULL,
    download_count  INTEGER NOT NULL DEFAULT 0,
    view_count      INTEGER NOT NULL DEFAULT 0,
    CHECK (blob_path IS NOT NULL OR (message IS NOT NULL AND length(trim(message)) > 0)),
    CHECK ((kind = 'file_and_message') = (blob_path IS NOT NULL))
);

CREATE INDEX idx_entries_owner_id ON entries(owner_id);
CREATE INDEX idx_entries_created_at ON entries(created_at);
"#,
    // v2: Payload size for storage statistics
    r#"
ALTER TABLE entries ADD COLUMN size INTEGER NOT NULL DEFAULT 0;
"#,
];
