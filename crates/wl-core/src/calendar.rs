//! Calendar-day arithmetic in a caller-supplied time zone.
//!
//! Timestamps are stored as epoch milliseconds, so every instant that reaches
//! the store is truncated to millisecond precision first.

use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Utc,
};

/// Truncates an instant to millisecond precision.
pub fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}

/// Converts stored epoch milliseconds back to an instant.
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// First and last instant of `date` in `tz`, both inclusive.
///
/// The end is the last millisecond before the next local midnight, which
/// matches the precision timestamps are stored at.
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, tz);
    let next = date
        .checked_add_days(Days::new(1))
        .map_or_else(|| start + TimeDelta::days(1), |next| local_midnight(next, tz));
    (start, next - TimeDelta::milliseconds(1))
}

/// The local calendar day an instant falls on.
pub fn local_date<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// Key identifying the local calendar day of `timestamp` (`YYYY-MM-DD`).
pub fn day_key<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String {
    local_date(timestamp, tz).format("%Y-%m-%d").to_string()
}

/// Interprets a wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant. Times
/// skipped by a forward transition are shifted by the offset in effect at the
/// same wall-clock reading in UTC.
pub fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&naive).fix();
            (naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
        }
    }
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN), tz)
}
