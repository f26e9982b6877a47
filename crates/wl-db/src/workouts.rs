//! Workout templates: named, ordered lists of exercises.

use rusqlite::{OptionalExtension, params};
use wl_core::types::validate_exercise_name;
use wl_core::{ExerciseId, Workout, WorkoutId};

use crate::{Database, DbError};

impl Database {
    /// Creates a workout template. Returns `false` if the name is taken.
    pub fn insert_workout(&mut self, name: &str) -> Result<bool, DbError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO workouts (name) VALUES (?)", [name])?;
        if inserted == 1 {
            tracing::info!(name, "created workout");
        }
        Ok(inserted == 1)
    }

    pub fn workout_id_by_name(&self, name: &str) -> Result<Option<WorkoutId>, DbError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM workouts WHERE name = ?",
                [name.trim()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(WorkoutId::new))
    }

    /// Lists workout templates by name.
    pub fn list_workouts(&self) -> Result<Vec<Workout>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM workouts ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Workout {
                id: WorkoutId::new(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Adds an exercise to a workout at position `order`.
    ///
    /// Adding an exercise that is already part of the workout moves it.
    pub fn add_exercise_to_workout(
        &mut self,
        workout_id: WorkoutId,
        exercise_id: ExerciseId,
        order: u32,
    ) -> Result<(), DbError> {
        self.conn.execute(
            r#"
            INSERT INTO workout_exercises (workout_id, exercise_id, "order") VALUES (?, ?, ?)
            ON CONFLICT(workout_id, exercise_id) DO UPDATE SET "order" = excluded."order"
            "#,
            params![workout_id.get(), exercise_id.get(), order],
        )?;
        tracing::debug!(
            workout_id = %workout_id,
            exercise_id = %exercise_id,
            order,
            "linked exercise"
        );
        Ok(())
    }

    /// Exercise names in a workout, in template order.
    pub fn exercises_for_workout(&self, workout_id: WorkoutId) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT e.name
            FROM workout_exercises we
            JOIN exercises e ON e.id = we.exercise_id
            WHERE we.workout_id = ?
            ORDER BY we."order" ASC, e.name ASC
            "#,
        )?;
        let rows = stmt.query_map([workout_id.get()], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Adds an exercise to a workout by name, creating the exercise if needed.
    pub fn add_exercise_to_workout_by_name(
        &mut self,
        workout_id: WorkoutId,
        exercise_name: &str,
        order: u32,
    ) -> Result<ExerciseId, DbError> {
        let exercise_name = validate_exercise_name(exercise_name)?;
        let exercise_id = self.resolve_or_create_exercise(exercise_name)?;
        self.add_exercise_to_workout(workout_id, exercise_id, order)?;
        Ok(exercise_id)
    }
}
