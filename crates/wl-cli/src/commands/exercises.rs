//! Exercise catalog commands.

use std::io::Write;

use anyhow::{Result, bail};
use wl_core::{Exercise, ExerciseId};
use wl_db::Database;

pub fn list<W: Write>(writer: &mut W, db: &Database, all: bool) -> Result<()> {
    let exercises: Vec<Exercise> = db
        .list_exercises()?
        .into_iter()
        .filter(|exercise| all || !exercise.archived)
        .collect();

    if exercises.is_empty() {
        writeln!(writer, "No exercises.")?;
        return Ok(());
    }

    for exercise in exercises {
        let mut flags = Vec::new();
        if exercise.is_factory {
            flags.push("built-in");
        }
        if exercise.archived {
            flags.push("archived");
        }
        if flags.is_empty() {
            writeln!(writer, "{}", exercise.name)?;
        } else {
            writeln!(writer, "{} ({})", exercise.name, flags.join(", "))?;
        }
    }
    Ok(())
}

pub fn add<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<()> {
    let name = wl_core::types::validate_exercise_name(name)?;
    if db.insert_exercise(name, false)? {
        writeln!(writer, "Added {name}.")?;
    } else {
        writeln!(writer, "{name} already exists.")?;
    }
    Ok(())
}

pub fn archive<W: Write>(writer: &mut W, db: &mut Database, name: &str, undo: bool) -> Result<()> {
    let id = require_exercise(db, name)?;
    db.archive_exercise(id, !undo)?;
    if undo {
        writeln!(writer, "Restored {name}.")?;
    } else {
        writeln!(writer, "Archived {name}.")?;
    }
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<()> {
    let id = require_exercise(db, name)?;
    db.delete_exercise(id)?;
    writeln!(writer, "Deleted {name} and its sets.")?;
    Ok(())
}

pub fn reset<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    let stats = db.reset_factory_defaults()?;
    writeln!(
        writer,
        "Removed {} exercises and {} sets.",
        stats.exercises_removed, stats.records_removed
    )?;
    Ok(())
}

fn require_exercise(db: &Database, name: &str) -> Result<ExerciseId> {
    match db.exercise_id_by_name(name)? {
        Some(id) => Ok(id),
        None => bail!("unknown exercise: {name}"),
    }
}
