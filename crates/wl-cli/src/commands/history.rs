//! History command for browsing logged sets.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::{NaiveDate, TimeZone};
use wl_core::{HistoryEntry, SessionId};
use wl_db::Database;

use super::util::{format_set, format_timestamp};

/// Which sets to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    Day(NaiveDate),
    Exercise(String),
    Session(SessionId),
}

/// Loads the selected sets paired with their exercise names.
///
/// Session history is chronological; every other view is most recent first.
pub fn load_entries<Tz: TimeZone>(
    db: &Database,
    filter: &HistoryFilter,
    tz: &Tz,
) -> Result<Vec<HistoryEntry>> {
    let records = match filter {
        HistoryFilter::All => db.activities_newest_first()?,
        HistoryFilter::Day(date) => db.activities_on_day(*date, tz)?,
        HistoryFilter::Exercise(name) => db.activities_for_exercise_name(name)?,
        HistoryFilter::Session(id) => {
            if db.session(*id)?.is_none() {
                bail!("unknown session: {id}");
            }
            db.activities_for_session(*id)?
        }
    };
    Ok(db.history_entries(records)?)
}

pub fn format_entries<Tz>(entries: &[HistoryEntry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        return "No sets logged.\n".to_string();
    }
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!(
            "{}  {:<24}  {:<14}  session {}\n",
            format_timestamp(entry.record.timestamp, tz),
            entry.exercise_name,
            format_set(&entry.record),
            entry.record.session_id
        ));
    }
    output
}

pub fn run<W, Tz>(
    writer: &mut W,
    db: &Database,
    filter: &HistoryFilter,
    json: bool,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = load_entries(db, filter, tz)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_entries(&entries, tz))?;
    }
    Ok(())
}
