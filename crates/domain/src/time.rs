//! Timestamp parsing and formatting
//!
//! Three timestamp dialects appear in a storage tree:
//! - marker files (`last_updated`, `downloaded`, ...) hold a local-clock
//!   ISO-8601 instant with fractional seconds,
//! - revision directory names hold a second-resolution ISO-8601 instant
//!   (or a plain date for older trees),
//! - the remote `stand` value arrives in the webservice's German notation
//!   (`dd.mm.yyyy`, optionally with a `hh:mm:ssh` time suffix).
//!
//! All of them parse into naive local datetimes; the engine never compares
//! timestamps across timezones.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::errors::{QuaderError, Result};

/// Format written by [`now_string`] and accepted back by [`parse_timestamp`].
const MARKER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format used for revision directory names.
const REVISION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local instant as an ISO-8601 string (marker file contents).
pub fn now_string() -> String {
    Local::now().naive_local().format(MARKER_FORMAT).to_string()
}

/// Render a timestamp as a revision directory name.
pub fn revision_name(ts: NaiveDateTime) -> String {
    ts.format(REVISION_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp (with optional fractional seconds) or a
/// plain ISO date (interpreted as midnight).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, MARKER_FORMAT) {
        return Ok(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    Err(QuaderError::Parse(format!("Not an ISO-8601 timestamp: `{trimmed}`")))
}

/// True if `name` is a valid revision directory name.
///
/// Returns the parsed timestamp so directory listings can sort on it.
pub fn parse_revision_name(name: &str) -> Option<NaiveDateTime> {
    parse_timestamp(name).ok()
}

/// Parse a remote `stand` value.
///
/// The webservice reports German-style dates (`31.12.2020`, optionally
/// followed by `13:12:05h`); metadata that has passed through the engine
/// once may already carry ISO-8601.
pub fn parse_stand(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in ["%d.%m.%Y %H:%M:%Sh", "%d.%m.%Y %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d.%m.%Y") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    parse_timestamp(trimmed)
        .map_err(|_| QuaderError::Parse(format!("Not a stand timestamp: `{trimmed}`")))
}
