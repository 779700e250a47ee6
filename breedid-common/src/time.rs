//! Timestamp utilities

use chrono::{DateTime, Local, TimeZone};

/// Format used for gallery file names and history timestamps (`YYYYMMDD-HHMMSS`)
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Get current local timestamp
///
/// Gallery names use local wall-clock time so they match what the user sees.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Format a timestamp as `YYYYMMDD-HHMMSS`
pub fn format_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(STAMP_FORMAT).to_string()
}

/// Convert seconds to duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}
