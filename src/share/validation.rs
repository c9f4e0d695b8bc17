//! Submission validation.

use super::request::{Payload, SubmitRequest};
use crate::auth::is_plausible_email;
use crate::entry::{MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH};
use crate::{Result, ShareError};

/// Accept a submission only if it carries a file, a non-blank message, or both.
pub fn validate_submission(payload: Option<&Payload>, message: Option<&str>) -> Result<()> {
    let has_message = message.is_some_and(|m| !m.trim().is_empty());
    if payload.is_some() || has_message {
        Ok(())
    } else {
        Err(ShareError::Validation(
            "select a file or enter a message".to_string(),
        ))
    }
}

/// Check lengths, upload size and recipient format.
pub fn validate_limits(request: &SubmitRequest, max_upload_bytes: u64) -> Result<()> {
    if let Some(payload) = &request.payload {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(ShareError::Validation("file name is empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ShareError::Validation(format!(
                "file name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        if payload.size() > max_upload_bytes {
            let max_mb = max_upload_bytes / 1024 / 1024;
            return Err(ShareError::Validation(format!(
                "file is too large (max {max_mb}MB)"
            )));
        }
    }

    if let Some(message) = &request.message {
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ShareError::Validation(format!(
                "message must be at most {MAX_MESSAGE_LENGTH} characters"
            )));
        }
    }

    if let Some(email) = request.recipient_email.as_deref().map(str::trim) {
        if !email.is_empty() && !is_plausible_email(email) {
            return Err(ShareError::Validation(format!(
                "invalid recipient email: {email}"
            )));
        }
    }

    Ok(())
}
