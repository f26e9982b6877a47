//! Activity log: storage and queries for logged sets.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Params, params};
use wl_core::calendar::{day_bounds, from_millis, truncate_to_millis};
use wl_core::{
    ActivityRecord, ActivityRecordId, ExerciseId, HistoryEntry, NewActivity, SessionId,
};

use crate::catalog::resolve_or_create;
use crate::{Database, DbError};

const ACTIVITY_COLUMNS: &str = "id, exercise_id, session_id, reps, weight, timestamp";

impl Database {
    /// Writes one activity record and returns it with its assigned ID.
    ///
    /// The exercise and session must exist. Reps and weight are not checked
    /// here; callers validate them first.
    pub fn insert_activity(&mut self, activity: &NewActivity) -> Result<ActivityRecord, DbError> {
        insert_record(&self.conn, activity)
    }

    /// Resolves `exercise_name` in the catalog and writes one record for it,
    /// in a single transaction.
    ///
    /// An exercise created here is rolled back if the record cannot be
    /// written, e.g. because the session does not exist.
    pub fn insert_activity_for_name(
        &mut self,
        exercise_name: &str,
        session_id: SessionId,
        reps: u32,
        weight: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<ActivityRecord, DbError> {
        let tx = self.conn.transaction()?;
        let exercise_id = resolve_or_create(&tx, exercise_name)?;
        let record = insert_record(
            &tx,
            &NewActivity {
                exercise_id,
                session_id,
                reps,
                weight,
                timestamp,
            },
        )?;
        tx.commit()?;
        Ok(record)
    }

    /// Lists every record, most recent first.
    pub fn activities_newest_first(&self) -> Result<Vec<ActivityRecord>, DbError> {
        self.query_activities(
            &format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activity_records ORDER BY timestamp DESC, id DESC"
            ),
            [],
        )
    }

    /// Lists records with `start <= timestamp <= end`, most recent first.
    pub fn activities_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        self.query_activities(
            &format!(
                "
                SELECT {ACTIVITY_COLUMNS}
                FROM activity_records
                WHERE timestamp BETWEEN ? AND ?
                ORDER BY timestamp DESC, id DESC
                "
            ),
            [start.timestamp_millis(), end.timestamp_millis()],
        )
    }

    /// Lists records logged on a local calendar day in `tz`, most recent first.
    pub fn activities_on_day<Tz: TimeZone>(
        &self,
        date: NaiveDate,
        tz: &Tz,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        let (start, end) = day_bounds(date, tz);
        self.activities_in_range(start, end)
    }

    /// Lists records for one exercise, most recent first.
    pub fn activities_for_exercise(
        &self,
        exercise_id: ExerciseId,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        self.query_activities(
            &format!(
                "
                SELECT {ACTIVITY_COLUMNS}
                FROM activity_records
                WHERE exercise_id = ?
                ORDER BY timestamp DESC, id DESC
                "
            ),
            [exercise_id.get()],
        )
    }

    /// Lists records for an exercise by name; empty when the name is unknown.
    pub fn activities_for_exercise_name(&self, name: &str) -> Result<Vec<ActivityRecord>, DbError> {
        match self.exercise_id_by_name(name)? {
            Some(id) => self.activities_for_exercise(id),
            None => {
                tracing::debug!(name, "exercise not found");
                Ok(Vec::new())
            }
        }
    }

    /// Lists a session's records in chronological order.
    pub fn activities_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        self.query_activities(
            &format!(
                "
                SELECT {ACTIVITY_COLUMNS}
                FROM activity_records
                WHERE session_id = ?
                ORDER BY timestamp ASC, id ASC
                "
            ),
            [session_id.get()],
        )
    }

    /// All-time heaviest set for an exercise.
    ///
    /// Ties on weight go to the most recent record, then the highest ID.
    pub fn personal_best(
        &self,
        exercise_id: ExerciseId,
    ) -> Result<Option<ActivityRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "
                    SELECT {ACTIVITY_COLUMNS}
                    FROM activity_records
                    WHERE exercise_id = ?
                    ORDER BY weight DESC, timestamp DESC, id DESC
                    LIMIT 1
                    "
                ),
                [exercise_id.get()],
                ActivityRow::from_row,
            )
            .optional()?;
        row.map(ActivityRow::into_record).transpose()
    }

    /// All-time personal best by exercise name; `None` when the name is unknown.
    pub fn personal_best_by_name(&self, name: &str) -> Result<Option<ActivityRecord>, DbError> {
        match self.exercise_id_by_name(name)? {
            Some(id) => self.personal_best(id),
            None => Ok(None),
        }
    }

    /// Pairs records with their exercise display names, keeping order.
    pub fn history_entries(
        &self,
        records: Vec<ActivityRecord>,
    ) -> Result<Vec<HistoryEntry>, DbError> {
        let names: HashMap<ExerciseId, String> = self
            .list_exercises()?
            .into_iter()
            .map(|exercise| (exercise.id, exercise.name))
            .collect();
        Ok(records
            .into_iter()
            .map(|record| HistoryEntry {
                exercise_name: names
                    .get(&record.exercise_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", record.exercise_id)),
                record,
            })
            .collect())
    }

    fn query_activities<P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, ActivityRow::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

struct ActivityRow {
    id: i64,
    exercise_id: i64,
    session_id: i64,
    reps: i64,
    weight: f64,
    timestamp: i64,
}

impl ActivityRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            exercise_id: row.get(1)?,
            session_id: row.get(2)?,
            reps: row.get(3)?,
            weight: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<ActivityRecord, DbError> {
        let timestamp = from_millis(self.timestamp).ok_or(DbError::InvalidTimestamp {
            table: "activity_records",
            id: self.id,
            millis: self.timestamp,
        })?;
        let reps = u32::try_from(self.reps).map_err(|_| DbError::InvalidReps {
            id: self.id,
            reps: self.reps,
        })?;
        Ok(ActivityRecord {
            id: ActivityRecordId::new(self.id),
            exercise_id: ExerciseId::new(self.exercise_id),
            session_id: SessionId::new(self.session_id),
            reps,
            weight: self.weight,
            timestamp,
        })
    }
}

fn insert_record(conn: &Connection, activity: &NewActivity) -> Result<ActivityRecord, DbError> {
    let mut activity = activity.clone();
    activity.timestamp = truncate_to_millis(activity.timestamp);
    conn.execute(
        "
        INSERT INTO activity_records (exercise_id, session_id, reps, weight, timestamp)
        VALUES (?, ?, ?, ?, ?)
        ",
        params![
            activity.exercise_id.get(),
            activity.session_id.get(),
            activity.reps,
            activity.weight,
            activity.timestamp.timestamp_millis(),
        ],
    )?;
    let id = ActivityRecordId::new(conn.last_insert_rowid());
    tracing::debug!(
        record_id = %id,
        exercise_id = %activity.exercise_id,
        session_id = %activity.session_id,
        "inserted activity"
    );
    Ok(activity.into_record(id))
}
