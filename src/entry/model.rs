//! Entry types for linkdrop.

use chrono::{DateTime, Utc};

use super::MESSAGE_ONLY_NAME;
use crate::{Result, ShareError};

/// Classification of an entry by the presence of a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A stored file, optionally with a message.
    FileAndMessage,
    /// Only a text message.
    MessageOnly,
}

impl EntryKind {
    /// Convert to the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::FileAndMessage => "file_and_message",
            EntryKind::MessageOnly => "message_only",
        }
    }

    /// Parse from the stored string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file_and_message" => Some(EntryKind::FileAndMessage),
            "message_only" => Some(EntryKind::MessageOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an entry carries.
///
/// A message-only entry always has a non-blank message; a file entry may
/// or may not have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Stored blob plus optional message.
    FileAndMessage {
        /// Path of the blob in the blob store.
        blob_path: String,
        /// Accompanying message.
        message: Option<String>,
    },
    /// Message without any stored blob.
    MessageOnly {
        /// The message text.
        message: String,
    },
}

impl EntryContent {
    /// Build content from nullable columns, enforcing the entry invariant.
    pub fn from_parts(blob_path: Option<String>, message: Option<String>) -> Result<Self> {
        let message = message.filter(|m| !m.trim().is_empty());
        match (blob_path, message) {
            (Some(blob_path), message) => Ok(EntryContent::FileAndMessage { blob_path, message }),
            (None, Some(message)) => Ok(EntryContent::MessageOnly { message }),
            (None, None) => Err(ShareError::Validation(
                "an entry needs a file or a message".to_string(),
            )),
        }
    }

    /// Kind derived from the variant.
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryContent::FileAndMessage { .. } => EntryKind::FileAndMessage,
            EntryContent::MessageOnly { .. } => EntryKind::MessageOnly,
        }
    }

    /// Blob path, if any.
    pub fn blob_path(&self) -> Option<&str> {
        match self {
            EntryContent::FileAndMessage { blob_path, .. } => Some(blob_path),
            EntryContent::MessageOnly { .. } => None,
        }
    }

    /// Message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            EntryContent::FileAndMessage { message, .. } => message.as_deref(),
            EntryContent::MessageOnly { message } => Some(message),
        }
    }
}

/// A shared file and/or message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Unique entry ID (UUID).
    pub id: String,
    /// Display name: the original filename, or [`MESSAGE_ONLY_NAME`].
    pub name: String,
    /// File and/or message.
    pub content: EntryContent,
    /// Notification destination.
    pub recipient_email: String,
    /// Instant after which the entry is inactive. `None` never expires.
    pub expiry_date: Option<DateTime<Utc>>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Number of issued download links.
    pub download_count: i64,
    /// Number of previews.
    pub view_count: i64,
    /// ID of the owning principal.
    pub owner_id: String,
    /// Payload size in bytes (0 for message-only entries).
    pub size: i64,
}

impl Entry {
    /// Kind of this entry.
    pub fn kind(&self) -> EntryKind {
        self.content.kind()
    }

    /// Blob path, if this entry has a file.
    pub fn blob_path(&self) -> Option<&str> {
        self.content.blob_path()
    }

    /// Message text, if any.
    pub fn message(&self) -> Option<&str> {
        self.content.message()
    }

    /// Check if this entry has no file attached.
    pub fn is_message_only(&self) -> bool {
        self.kind() == EntryKind::MessageOnly
    }

    /// Expiry formatted for display in the given timezone.
    pub fn display_expiry(&self, timezone: &str) -> String {
        crate::datetime::format_expiry(self.expiry_date.as_ref(), timezone)
    }
}

/// Data for creating a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Owner of the entry.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// File and/or message.
    pub content: EntryContent,
    /// Notification destination.
    pub recipient_email: String,
    /// Expiry instant.
    pub expiry_date: Option<DateTime<Utc>>,
    /// Payload size in bytes.
    pub size: i64,
}

impl NewEntry {
    /// Create a new message-only entry.
    pub fn message_only(
        owner_id: impl Into<String>,
        message: impl Into<String>,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: MESSAGE_ONLY_NAME.to_string(),
            content: EntryContent::MessageOnly {
                message: message.into(),
            },
            recipient_email: recipient_email.into(),
            expiry_date: None,
            size: 0,
        }
    }

    /// Create a new file entry.
    pub fn file(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        blob_path: impl Into<String>,
        size: i64,
        recipient_email: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            content: EntryContent::FileAndMessage {
                blob_path: blob_path.into(),
                message: None,
            },
            recipient_email: recipient_email.into(),
            expiry_date: None,
            size,
        }
    }

    /// Attach a message to a file entry. No effect on message-only entries.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        if let EntryContent::FileAndMessage { message, .. } = &mut self.content {
            let text = text.into();
            *message = if text.trim().is_empty() {
                None
            } else {
                Some(text)
            };
        }
        self
    }

    /// Set the expiry instant.
    pub fn with_expiry(mut self, expiry_date: Option<DateTime<Utc>>) -> Self {
        self.expiry_date = expiry_date;
        self
    }
}
