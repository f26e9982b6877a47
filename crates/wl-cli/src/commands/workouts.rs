//! Workout template commands.

use std::io::Write;

use anyhow::{Result, bail};
use wl_core::WorkoutId;
use wl_db::Database;

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let workouts = db.list_workouts()?;
    if workouts.is_empty() {
        writeln!(writer, "No workouts.")?;
        return Ok(());
    }
    for workout in workouts {
        let count = db.exercises_for_workout(workout.id)?.len();
        writeln!(writer, "{} ({count} exercises)", workout.name)?;
    }
    Ok(())
}

pub fn create<W: Write>(writer: &mut W, db: &mut Database, name: &str) -> Result<()> {
    if db.insert_workout(name)? {
        writeln!(writer, "Created {}.", name.trim())?;
    } else if name.trim().is_empty() {
        bail!("workout name cannot be empty");
    } else {
        writeln!(writer, "{} already exists.", name.trim())?;
    }
    Ok(())
}

pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    workout: &str,
    exercise: &str,
    order: u32,
) -> Result<()> {
    let workout_id = require_workout(db, workout)?;
    db.add_exercise_to_workout_by_name(workout_id, exercise, order)?;
    writeln!(
        writer,
        "Added {} to {} at position {order}.",
        exercise.trim(),
        workout.trim()
    )?;
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, workout: &str) -> Result<()> {
    let workout_id = require_workout(db, workout)?;
    let exercises = db.exercises_for_workout(workout_id)?;
    writeln!(writer, "{}", workout.trim())?;
    if exercises.is_empty() {
        writeln!(writer, "  (no exercises)")?;
    }
    for (idx, name) in exercises.iter().enumerate() {
        writeln!(writer, "  {}. {name}", idx + 1)?;
    }
    Ok(())
}

fn require_workout(db: &Database, name: &str) -> Result<WorkoutId> {
    match db.workout_id_by_name(name)? {
        Some(id) => Ok(id),
        None => bail!("unknown workout: {}", name.trim()),
    }
}
