//! Date/time utilities for linkdrop.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::{Result, ShareError};

/// Default display format for timestamps.
pub const DEFAULT_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Format a DateTime<Utc> in the specified timezone.
///
/// Falls back to UTC when the timezone name is unknown.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}

/// Format an optional expiry timestamp for display.
///
/// `None` renders as "never".
pub fn format_expiry(expiry: Option<&DateTime<Utc>>, timezone: &str) -> String {
    match expiry {
        Some(dt) => format_utc_datetime(dt, timezone, DEFAULT_FORMAT),
        None => "never".to_string(),
    }
}

/// Compute an expiry instant `days` days after `now`.
///
/// Zero days means no expiry. Instants past the representable range are
/// rejected with [`ShareError::Validation`].
pub fn expiry_after_days(now: DateTime<Utc>, days: u32) -> Result<Option<DateTime<Utc>>> {
    if days == 0 {
        return Ok(None);
    }
    Duration::try_days(i64::from(days))
        .and_then(|delta| now.checked_add_signed(delta))
        .map(Some)
        .ok_or_else(|| {
            ShareError::Validation(format!("expiry of {days} days is too far in the future"))
        })
}
