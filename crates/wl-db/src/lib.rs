//! Storage layer for the workout log.
//!
//! Provides persistence for exercises, sessions and activity records using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! For multi-threaded or async callers, use [`SharedDatabase`], which serializes
//! access behind a mutex and runs each call on tokio's blocking pool.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as INTEGER milliseconds since the Unix epoch (UTC).
//! Values are truncated to millisecond precision before they are written, so a
//! record read back compares equal to the one that was inserted.
//!
//! ## Exercise Identity
//!
//! `exercises.name` is `UNIQUE`. Resolving a name to an ID is a single upsert
//! statement, so concurrent resolvers never create duplicate rows.
//!
//! ## Imported Sessions
//!
//! Sessions created by the bulk importer carry a `day_key` (`YYYY-MM-DD`),
//! which is `UNIQUE` so every imported calendar day maps to one session.
//! Sessions started interactively leave it NULL.

mod activity;
mod catalog;
mod import;
mod sessions;
mod shared;
mod workout_log;
mod workouts;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use wl_core::ValidationError;

pub use catalog::{ResetStats, SeedStats};
pub use import::{ImportSummary, Importer, SkippedRow};
pub use shared::{SharedDatabase, SharedWorkoutLog};
pub use workout_log::{SessionTracker, WorkoutLog, WorkoutLogError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Input rejected before reaching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A stored timestamp is outside the representable range.
    #[error("invalid timestamp in {table} row {id}: {millis}")]
    InvalidTimestamp {
        table: &'static str,
        id: i64,
        millis: i64,
    },
    /// A stored rep count is negative or too large.
    #[error("invalid reps in activity record {id}: {reps}")]
    InvalidReps { id: i64, reps: i64 },
    /// The import source could not be read.
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    /// A background database task panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                factory INTEGER NOT NULL DEFAULT 0,
                archived INTEGER NOT NULL DEFAULT 0
            );

            -- start_timestamp / end_timestamp: epoch milliseconds, end NULL while open
            -- day_key: local date of an imported day, NULL for live sessions
            CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_timestamp INTEGER NOT NULL,
                end_timestamp INTEGER,
                day_key TEXT UNIQUE
            );

            CREATE INDEX IF NOT EXISTS idx_session_start ON session(start_timestamp);

            CREATE TABLE IF NOT EXISTS activity_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                exercise_id INTEGER NOT NULL,
                session_id INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL NOT NULL,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY (exercise_id) REFERENCES exercises(id),
                FOREIGN KEY (session_id) REFERENCES session(id)
            );

            CREATE INDEX IF NOT EXISTS idx_activity_timestamp ON activity_records(timestamp);
            CREATE INDEX IF NOT EXISTS idx_activity_exercise ON activity_records(exercise_id);
            CREATE INDEX IF NOT EXISTS idx_activity_session ON activity_records(session_id);

            CREATE TABLE IF NOT EXISTS volume_groups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS workouts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS workout_exercises (
                workout_id INTEGER NOT NULL,
                exercise_id INTEGER NOT NULL,
                "order" INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (workout_id, exercise_id),
                FOREIGN KEY (workout_id) REFERENCES workouts(id) ON DELETE CASCADE,
                FOREIGN KEY (exercise_id) REFERENCES exercises(id) ON DELETE CASCADE
            );
            "#,
        )?;
        Ok(())
    }
}
