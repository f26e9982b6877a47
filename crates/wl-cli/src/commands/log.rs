//! Log command: record one set into the open session.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wl_db::{Database, WorkoutLog, WorkoutLogError};

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    exercise: &str,
    reps: i64,
    weight: f64,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut log = WorkoutLog::resume(db)?;
    let record = match log.record_activity_at(exercise, reps, weight, now) {
        Err(WorkoutLogError::NoActiveSession) => {
            anyhow::bail!("no open session; run `wl session start` first")
        }
        other => other.context("failed to record set")?,
    };

    let total = log.total_reps(exercise)?;
    let is_session_best = log
        .session_personal_best(exercise)?
        .is_some_and(|best| best.id == record.id);

    write!(
        writer,
        "Logged {} x {:.1} kg of {}",
        record.reps,
        record.weight,
        exercise.trim()
    )?;
    if is_session_best && log.session_history().len() > 1 {
        write!(writer, " (session best)")?;
    }
    writeln!(writer, ". {total} reps this session.")?;
    Ok(())
}
