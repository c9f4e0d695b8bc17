//! Share workflows for linkdrop.
//!
//! This module provides the operations a principal performs on entries:
//! - Submit a file and/or message
//! - Issue a signed, time-limited link
//! - Preview, download and delete
//! - List, dashboard statistics and orphan reconciliation

mod request;
mod service;
mod validation;

pub use request::{DownloadResult, Payload, Preview, SubmitRequest};
pub use service::{ShareService, DEFAULT_LINK_VALIDITY, DEFAULT_MAX_UPLOAD_BYTES};
pub use validation::{validate_limits, validate_submission};
