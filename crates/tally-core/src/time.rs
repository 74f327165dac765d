//! Duration and date helpers.
//!
//! Everything here is pure: callers supply the instants, nothing reads the
//! clock.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

/// Returns a new random identifier (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whole seconds elapsed between `start` and `end`, rounded down.
///
/// Negative when `end` precedes `start`; the value is not clamped.
pub fn calculate_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(1000)
}

/// Formats seconds as `"{hours}h {minutes}m"`, dropping leftover seconds.
pub fn format_duration(seconds: i64) -> String {
    let hours = seconds.div_euclid(3600);
    let minutes = (seconds % 3600).div_euclid(60);
    format!("{hours}h {minutes}m")
}

/// Formats a calendar date in long form, e.g. `"15 January 2025"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

/// Seconds the active session has been running at `now`.
pub fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    calculate_duration(start, now)
}

/// Formats elapsed seconds as `HH:MM:SS`.
///
/// Negative input (clock skew) renders as `00:00:00`.
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < 0 {
        return "00:00:00".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats the time of day as 24-hour `HH:MM`.
pub fn format_clock<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.format("%H:%M").to_string()
}
