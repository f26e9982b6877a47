//! Session commands: start, end and show the current session.

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use wl_core::{ExerciseId, stats};
use wl_db::{Database, WorkoutLog};

use super::util::{format_duration, format_set, format_timestamp, format_weight};

pub fn start<W, Tz>(writer: &mut W, db: &mut Database, now: DateTime<Utc>, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut log = WorkoutLog::resume(db)?;
    if let Some(previous) = log.current_session().filter(|_| log.is_active()) {
        writeln!(writer, "Ending session {}.", previous.id)?;
    }
    let session = log.start_new_session_at(now)?;
    writeln!(
        writer,
        "Started session {} at {}.",
        session.id,
        format_timestamp(session.started_at, tz)
    )?;
    Ok(())
}

pub fn end<W: Write>(writer: &mut W, db: &mut Database, now: DateTime<Utc>) -> Result<()> {
    let mut log = WorkoutLog::resume(db)?;
    let session = log.end_session_at(now)?;
    let sets = log.session_history().len();
    let duration = log.session_duration().map_or_else(String::new, |d| {
        format!(" after {}", format_duration(d))
    });
    writeln!(writer, "Ended session {}{duration} ({sets} sets).", session.id)?;
    Ok(())
}

pub fn show<W, Tz>(writer: &mut W, db: &mut Database, now: DateTime<Utc>, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let names: HashMap<ExerciseId, String> = db
        .list_exercises()?
        .into_iter()
        .map(|exercise| (exercise.id, exercise.name))
        .collect();
    let log = WorkoutLog::resume(db)?;
    let Some(session) = log.current_session() else {
        writeln!(writer, "No open session.")?;
        return Ok(());
    };
    let name_of = |id: ExerciseId| names.get(&id).map_or("?", String::as_str);

    writeln!(
        writer,
        "Session {} started {} ({} so far)",
        session.id,
        format_timestamp(session.started_at, tz),
        format_duration(now - session.started_at)
    )?;

    let history = log.session_history();
    if history.is_empty() {
        writeln!(writer, "No sets logged yet.")?;
        return Ok(());
    }

    writeln!(writer)?;
    for record in history {
        writeln!(
            writer,
            "{}  {:<24}  {}",
            format_timestamp(record.timestamp, tz),
            name_of(record.exercise_id),
            format_set(record)
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{:<24}  {:>4}  {:>5}  {:>10}  {:>10}",
        "Exercise", "Sets", "Reps", "Avg", "Best"
    )?;
    for summary in stats::summarize(history) {
        writeln!(
            writer,
            "{:<24}  {:>4}  {:>5}  {:>10}  {:>10}",
            name_of(summary.exercise_id),
            summary.sets,
            summary.total_reps,
            format_weight(summary.average_weight),
            format_weight(summary.best_weight)
        )?;
    }
    Ok(())
}
