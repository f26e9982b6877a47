//! Best command: all-time personal best for an exercise.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use wl_db::Database;

use super::util::{format_set, format_timestamp};

pub fn run<W, Tz>(writer: &mut W, db: &Database, exercise: &str, json: bool, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let best = db.personal_best_by_name(exercise)?;
    if json {
        let entry = best
            .map(|record| db.history_entries(vec![record]))
            .transpose()?
            .and_then(|entries| entries.into_iter().next());
        writeln!(writer, "{}", serde_json::to_string_pretty(&entry)?)?;
        return Ok(());
    }

    match best {
        Some(record) => writeln!(
            writer,
            "{}: {} on {} (session {})",
            exercise.trim(),
            format_set(&record),
            format_timestamp(record.timestamp, tz),
            record.session_id
        )?,
        None => writeln!(writer, "No sets logged for {}.", exercise.trim())?,
    }
    Ok(())
}
