//! Exercise catalog and volume-group reference data.

use rusqlite::{Connection, OptionalExtension, params};
use wl_core::types::validate_exercise_name;
use wl_core::{Exercise, ExerciseId, FACTORY_EXERCISES, VOLUME_GROUPS};

use crate::{Database, DbError};

/// Summary of a factory reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetStats {
    pub exercises_removed: usize,
    pub records_removed: usize,
}

/// Rows written while seeding built-in reference data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub exercises_inserted: usize,
    pub volume_groups_inserted: usize,
}

impl Database {
    /// Inserts an exercise unless the name is blank or already present.
    ///
    /// Returns `true` only when a new row was written.
    pub fn insert_exercise(&mut self, name: &str, is_factory: bool) -> Result<bool, DbError> {
        let Ok(name) = validate_exercise_name(name) else {
            return Ok(false);
        };
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO exercises (name, factory) VALUES (?, ?)",
            params![name, is_factory],
        )?;
        if inserted == 0 {
            tracing::debug!(name, "exercise already exists, skipping insert");
        } else {
            tracing::debug!(name, is_factory, "inserted exercise");
        }
        Ok(inserted == 1)
    }

    /// Returns the ID for `name`, creating a user-defined exercise if unseen.
    ///
    /// Runs as one upsert against the `UNIQUE(name)` constraint, so repeated
    /// or concurrent calls with the same name always yield the same row.
    pub fn resolve_or_create_exercise(&mut self, name: &str) -> Result<ExerciseId, DbError> {
        resolve_or_create(&self.conn, name)
    }

    /// Looks up an exercise ID by exact name.
    pub fn exercise_id_by_name(&self, name: &str) -> Result<Option<ExerciseId>, DbError> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM exercises WHERE name = ?",
                [name.trim()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(ExerciseId::new))
    }

    /// Looks up an exercise display name by ID.
    pub fn exercise_name_by_id(&self, id: ExerciseId) -> Result<Option<String>, DbError> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM exercises WHERE id = ?",
                [id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    /// Fetches a full catalog entry by name.
    pub fn exercise_by_name(&self, name: &str) -> Result<Option<Exercise>, DbError> {
        let exercise = self
            .conn
            .query_row(
                "SELECT id, name, factory, archived FROM exercises WHERE name = ?",
                [name.trim()],
                exercise_from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Lists every exercise, archived ones included, ordered by name.
    pub fn list_exercises(&self) -> Result<Vec<Exercise>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, factory, archived
            FROM exercises
            ORDER BY name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], exercise_from_row)?;
        let mut exercises = Vec::new();
        for row in rows {
            exercises.push(row?);
        }
        Ok(exercises)
    }

    /// Sets or clears the archived flag. Returns `false` for an unknown ID.
    pub fn archive_exercise(&mut self, id: ExerciseId, archived: bool) -> Result<bool, DbError> {
        let updated = self.conn.execute(
            "UPDATE exercises SET archived = ? WHERE id = ?",
            params![archived, id.get()],
        )?;
        if updated == 0 {
            tracing::warn!(exercise_id = %id, "cannot archive unknown exercise");
        } else {
            tracing::info!(exercise_id = %id, archived, "updated exercise archive status");
        }
        Ok(updated == 1)
    }

    /// Deletes an exercise together with its activity records and template
    /// links. Returns `false` for an unknown ID.
    pub fn delete_exercise(&mut self, id: ExerciseId) -> Result<bool, DbError> {
        let tx = self.conn.transaction()?;
        let records = tx.execute(
            "DELETE FROM activity_records WHERE exercise_id = ?",
            [id.get()],
        )?;
        tx.execute(
            "DELETE FROM workout_exercises WHERE exercise_id = ?",
            [id.get()],
        )?;
        let deleted = tx.execute("DELETE FROM exercises WHERE id = ?", [id.get()])?;
        tx.commit()?;
        if deleted == 0 {
            tracing::warn!(exercise_id = %id, "cannot delete unknown exercise");
        } else {
            tracing::info!(exercise_id = %id, records, "deleted exercise");
        }
        Ok(deleted == 1)
    }

    /// Removes every user-defined exercise and everything referencing it.
    ///
    /// Dependent activity records go first, inside the same transaction, so
    /// no reader ever observes records pointing at a missing exercise.
    pub fn reset_factory_defaults(&mut self) -> Result<ResetStats, DbError> {
        let tx = self.conn.transaction()?;
        let records_removed = tx.execute(
            "
            DELETE FROM activity_records
            WHERE exercise_id IN (SELECT id FROM exercises WHERE factory = 0)
            ",
            [],
        )?;
        tx.execute(
            "
            DELETE FROM workout_exercises
            WHERE exercise_id IN (SELECT id FROM exercises WHERE factory = 0)
            ",
            [],
        )?;
        let exercises_removed = tx.execute("DELETE FROM exercises WHERE factory = 0", [])?;
        tx.commit()?;

        let stats = ResetStats {
            exercises_removed,
            records_removed,
        };
        tracing::info!(?stats, "reset exercise catalog to factory defaults");
        Ok(stats)
    }

    /// Inserts the built-in exercises and volume groups that are missing.
    pub fn seed_factory_defaults(&mut self) -> Result<SeedStats, DbError> {
        let tx = self.conn.transaction()?;
        let mut stats = SeedStats::default();
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO exercises (name, factory) VALUES (?, 1)")?;
            for name in FACTORY_EXERCISES {
                stats.exercises_inserted += stmt.execute([name])?;
            }
        }
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO volume_groups (name) VALUES (?)")?;
            for name in VOLUME_GROUPS {
                stats.volume_groups_inserted += stmt.execute([name])?;
            }
        }
        tx.commit()?;
        if stats != SeedStats::default() {
            tracing::info!(?stats, "seeded factory defaults");
        }
        Ok(stats)
    }

    /// Adds a volume group, ignoring duplicates.
    pub fn insert_volume_group(&mut self, name: &str) -> Result<bool, DbError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO volume_groups (name) VALUES (?)",
            [name],
        )?;
        Ok(inserted == 1)
    }

    /// Lists volume group names in alphabetical order.
    pub fn list_volume_groups(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM volume_groups ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }
}

fn exercise_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: ExerciseId::new(row.get(0)?),
        name: row.get(1)?,
        is_factory: row.get(2)?,
        archived: row.get(3)?,
    })
}

pub(super) fn resolve_or_create(conn: &Connection, name: &str) -> Result<ExerciseId, DbError> {
    let name = validate_exercise_name(name)?;
    let id: i64 = conn.query_row(
        "
        INSERT INTO exercises (name, factory) VALUES (?, 0)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        ",
        [name],
        |row| row.get(0),
    )?;
    Ok(ExerciseId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Utc};
    use wl_core::{NewActivity, ValidationError};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn count(db: &Database, sql: &str) -> i64 {
        db.conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn insert_exercise_reports_duplicates() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.insert_exercise("Bench Press", false).unwrap());
        assert!(!db.insert_exercise("Bench Press", true).unwrap());
        assert!(!db.insert_exercise("", false).unwrap());
        assert!(!db.insert_exercise("   ", false).unwrap());
        assert_eq!(count(&db, "SELECT COUNT(*) FROM exercises"), 1);

        let stored = db.exercise_by_name("Bench Press").unwrap().unwrap();
        assert!(!stored.is_factory);
    }

    #[test]
    fn resolve_or_create_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db.resolve_or_create_exercise("Deadlift").unwrap();
        let second = db.resolve_or_create_exercise("Deadlift").unwrap();
        assert_eq!(first, second);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM exercises"), 1);

        let other = db.resolve_or_create_exercise("Squat").unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn resolve_or_create_reuses_factory_entries() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_exercise("Leg Press", true).unwrap();
        let id = db.resolve_or_create_exercise("Leg Press").unwrap();
        assert_eq!(db.exercise_id_by_name("Leg Press").unwrap(), Some(id));
        let stored = db.exercise_by_name("Leg Press").unwrap().unwrap();
        assert!(stored.is_factory);
    }

    #[test]
    fn resolve_or_create_rejects_blank_names() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db.resolve_or_create_exercise(" ").unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn lookups_return_none_when_missing() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.exercise_id_by_name("Nope").unwrap(), None);
        assert_eq!(db.exercise_name_by_id(ExerciseId::new(99)).unwrap(), None);

        let id = db.resolve_or_create_exercise("Pull-Up").unwrap();
        assert_eq!(
            db.exercise_name_by_id(id).unwrap().as_deref(),
            Some("Pull-Up")
        );
    }

    #[test]
    fn list_exercises_is_sorted_by_name() {
        let mut db = Database::open_in_memory().unwrap();
        for name in ["Squat", "Bench Press", "Deadlift"] {
            db.insert_exercise(name, false).unwrap();
        }
        let names: Vec<String> = db
            .list_exercises()
            .unwrap()
            .into_iter()
            .map(|exercise| exercise.name)
            .collect();
        assert_eq!(names, vec!["Bench Press", "Deadlift", "Squat"]);
    }

    #[test]
    fn archive_toggles_flag_and_reports_unknown_ids() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db.resolve_or_create_exercise("Dips").unwrap();
        assert!(db.archive_exercise(id, true).unwrap());
        assert!(db.exercise_by_name("Dips").unwrap().unwrap().archived);
        assert!(db.archive_exercise(id, false).unwrap());
        assert!(!db.exercise_by_name("Dips").unwrap().unwrap().archived);
        assert!(!db.archive_exercise(ExerciseId::new(404), true).unwrap());
    }

    #[test]
    fn delete_exercise_removes_its_records() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_session(at("2025-01-01T10:00:00Z")).unwrap();
        let id = db.resolve_or_create_exercise("Row").unwrap();
        db.insert_activity(&NewActivity {
            exercise_id: id,
            session_id: session.id,
            reps: 10,
            weight: 50.0,
            timestamp: at("2025-01-01T10:05:00Z"),
        })
        .unwrap();

        assert!(db.delete_exercise(id).unwrap());
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity_records"), 0);
        assert_eq!(db.exercise_id_by_name("Row").unwrap(), None);
        assert!(!db.delete_exercise(id).unwrap());
    }

    #[test]
    fn reset_keeps_only_factory_exercises_and_their_records() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_session(at("2025-01-01T10:00:00Z")).unwrap();
        db.insert_exercise("Factory A", true).unwrap();
        db.insert_exercise("Factory B", true).unwrap();
        db.insert_exercise("Custom A", false).unwrap();
        db.insert_exercise("Custom B", false).unwrap();

        for (minute, name) in ["Factory A", "Factory B", "Custom A", "Custom B"]
            .into_iter()
            .enumerate()
        {
            let exercise_id = db.exercise_id_by_name(name).unwrap().unwrap();
            db.insert_activity(&NewActivity {
                exercise_id,
                session_id: session.id,
                reps: 5,
                weight: 20.0,
                timestamp: at(&format!("2025-01-01T10:0{minute}:00Z")),
            })
            .unwrap();
        }

        let stats = db.reset_factory_defaults().unwrap();
        assert_eq!(
            stats,
            ResetStats {
                exercises_removed: 2,
                records_removed: 2,
            }
        );

        let remaining: Vec<String> = db
            .list_exercises()
            .unwrap()
            .into_iter()
            .map(|exercise| exercise.name)
            .collect();
        assert_eq!(remaining, vec!["Factory A", "Factory B"]);

        let records = db.activities_newest_first().unwrap();
        assert_eq!(records.len(), 2);
        let factory_a = db.exercise_id_by_name("Factory A").unwrap().unwrap();
        let factory_b = db.exercise_id_by_name("Factory B").unwrap().unwrap();
        assert!(
            records
                .iter()
                .all(|record| record.exercise_id == factory_a || record.exercise_id == factory_b)
        );
    }

    #[test]
    fn seed_factory_defaults_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db.seed_factory_defaults().unwrap();
        assert_eq!(first.exercises_inserted, FACTORY_EXERCISES.len());
        assert_eq!(first.volume_groups_inserted, VOLUME_GROUPS.len());

        let second = db.seed_factory_defaults().unwrap();
        assert_eq!(second, SeedStats::default());

        let exercises = db.list_exercises().unwrap();
        assert_eq!(exercises.len(), FACTORY_EXERCISES.len());
        assert!(exercises.iter().all(|exercise| exercise.is_factory));
    }

    #[test]
    fn volume_groups_are_unique_and_sorted() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.insert_volume_group("Legs").unwrap());
        assert!(db.insert_volume_group("Arms").unwrap());
        assert!(!db.insert_volume_group("Legs").unwrap());
        assert_eq!(db.list_volume_groups().unwrap(), vec!["Arms", "Legs"]);
    }
}
