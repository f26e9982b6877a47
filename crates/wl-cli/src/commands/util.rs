//! Shared formatting for CLI commands.

use std::fmt::Display;

use chrono::{DateTime, Duration, TimeZone, Utc};
use wl_core::ActivityRecord;

/// Formats an instant as local wall-clock time in `tz`.
pub fn format_timestamp<Tz>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn format_weight(weight: f64) -> String {
    format!("{weight:.1} kg")
}

/// One-line description of a set: `reps x weight`.
pub fn format_set(record: &ActivityRecord) -> String {
    format!("{} x {}", record.reps, format_weight(record.weight))
}

/// Formats a duration as hours and minutes (e.g., "1h 15m", "45m").
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
