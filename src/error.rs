//! Error types for linkdrop.

use thiserror::Error;

/// Common error type for linkdrop workflows.
#[derive(Error, Debug)]
pub enum ShareError {
    /// Submission or input rejected before any side effect.
    #[error("validation error: {0}")]
    Validation(String),

    /// Blob read/write/delete failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Record read/write/delete failure.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Referenced entry or blob does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Principal does not own the target entry.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Operation does not apply to this kind of entry.
    #[error("not applicable: {0}")]
    NotApplicable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error outside of blob handling (config, log files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for ShareError {
    fn from(e: sqlx::Error) -> Self {
        ShareError::Persistence(e.to_string())
    }
}

/// Result type alias for linkdrop operations.
pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ShareError::Validation("empty submission".to_string());
        assert_eq!(err.to_string(), "validation error: empty submission");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ShareError::NotFound("blob".to_string());
        assert_eq!(err.to_string(), "blob not found");
    }

    #[test]
    fn test_authorization_error_display() {
        let err = ShareError::Authorization("entry belongs to another user".to_string());
        assert_eq!(
            err.to_string(),
            "authorization error: entry belongs to another user"
        );
    }

    #[test]
    fn test_not_applicable_error_display() {
        let err = ShareError::NotApplicable("message-only entry".to_string());
        assert_eq!(err.to_string(), "not applicable: message-only entry");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShareError = io_err.into();
        assert!(matches!(err, ShareError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: ShareError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ShareError::Persistence(_)));
    }
}
