//! Request and result types of the share workflows.

use crate::entry::Entry;

/// Binary content submitted with an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Original filename.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl Payload {
    /// Create a new payload.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A file and/or message submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    /// Optional file.
    pub payload: Option<Payload>,
    /// Optional message text.
    pub message: Option<String>,
    /// Notification destination; the submitter's own email when `None`.
    pub recipient_email: Option<String>,
    /// Days until expiry; `0` never expires.
    pub expiry_days: u32,
}

impl SubmitRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a file.
    pub fn with_file(mut self, name: impl Into<String>, content: Vec<u8>) -> Self {
        self.payload = Some(Payload::new(name, content));
        self
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the recipient.
    pub fn with_recipient(mut self, email: impl Into<String>) -> Self {
        self.recipient_email = Some(email.into());
        self
    }

    /// Set the expiry in days.
    pub fn expires_in_days(mut self, days: u32) -> Self {
        self.expiry_days = days;
        self
    }
}

/// Blob content of an entry.
#[derive(Debug)]
pub struct DownloadResult {
    /// Entry metadata (counters as before the download).
    pub entry: Entry,
    /// File content.
    pub content: Vec<u8>,
    /// MIME type guessed from the entry name.
    pub content_type: String,
}

/// What the owner sees when previewing an entry.
#[derive(Debug)]
pub struct Preview {
    /// Entry metadata (counters as before the preview).
    pub entry: Entry,
    /// File content, for file entries.
    pub content: Option<Vec<u8>>,
    /// MIME type guessed from the entry name, for file entries.
    pub content_type: Option<String>,
}

/// Guess a MIME type from a filename.
pub(crate) fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_builder() {
        let request = SubmitRequest::new()
            .with_file("a.txt", b"abc".to_vec())
            .with_message("hi")
            .with_recipient("bob@example.com")
            .expires_in_days(7);

        assert_eq!(request.payload.as_ref().unwrap().size(), 3);
        assert_eq!(request.message.as_deref(), Some("hi"));
        assert_eq!(request.recipient_email.as_deref(), Some("bob@example.com"));
        assert_eq!(request.expiry_days, 7);
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a.txt"), "text/plain");
        assert_eq!(guess_content_type("photo.PNG"), "image/png");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }
}
