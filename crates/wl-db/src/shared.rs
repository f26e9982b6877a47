//! Async access to a [`Database`] and the workout log service from tokio
//! code.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use wl_core::{ActivityRecord, Exercise, ExerciseId, Session};

use crate::workout_log::SessionTracker;
use crate::{Database, DbError, WorkoutLogError};

/// A database handle that can be cloned across tasks.
///
/// Calls run one at a time on tokio's blocking pool, so writes are
/// serialized and async callers never block their executor thread.
#[derive(Clone)]
pub struct SharedDatabase {
    db: Arc<Mutex<Database>>,
}

impl SharedDatabase {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Database::open(path).map(Self::from)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Database::open_in_memory().map(Self::from)
    }

    /// Runs `f` against the database on the blocking pool.
    pub async fn run<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Database) -> Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|_| DbError::Task("database mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|err| DbError::Task(err.to_string()))?
    }

    pub async fn resolve_or_create_exercise(&self, name: &str) -> Result<ExerciseId, DbError> {
        let name = name.to_string();
        self.run(move |db| db.resolve_or_create_exercise(&name)).await
    }

    pub async fn list_exercises(&self) -> Result<Vec<Exercise>, DbError> {
        self.run(|db| db.list_exercises()).await
    }

    pub async fn activities_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        self.run(move |db| db.activities_in_range(start, end)).await
    }

    pub async fn personal_best(&self, name: &str) -> Result<Option<ActivityRecord>, DbError> {
        let name = name.to_string();
        self.run(move |db| db.personal_best_by_name(&name)).await
    }
}

impl From<Database> for SharedDatabase {
    fn from(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

/// The workout log service for async callers.
///
/// Clones share one session: a session started through any clone is the one
/// every clone records into, and each call sees the writes of earlier ones.
#[derive(Clone)]
pub struct SharedWorkoutLog {
    db: SharedDatabase,
    tracker: Arc<Mutex<SessionTracker>>,
}

impl SharedWorkoutLog {
    /// Creates an idle service.
    pub fn new(db: SharedDatabase) -> Self {
        Self::with_tracker(db, SessionTracker::default())
    }

    /// Creates a service that continues the most recent open session, if any.
    pub async fn resume(db: SharedDatabase) -> Result<Self, WorkoutLogError> {
        let tracker = db.run(|db| SessionTracker::resume(db)).await?;
        Ok(Self::with_tracker(db, tracker))
    }

    fn with_tracker(db: SharedDatabase, tracker: SessionTracker) -> Self {
        Self {
            db,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    pub const fn database(&self) -> &SharedDatabase {
        &self.db
    }

    /// Runs `f` with the session state and the database on the blocking pool.
    ///
    /// The database lock is taken before the state lock, so calls on one
    /// service are applied one at a time.
    async fn update<F, R>(&self, f: F) -> Result<R, WorkoutLogError>
    where
        F: FnOnce(&mut SessionTracker, &mut Database) -> Result<R, WorkoutLogError>
            + Send
            + 'static,
        R: Send + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        self.db
            .run(move |db| {
                let mut tracker = tracker
                    .lock()
                    .map_err(|_| DbError::Task("session state mutex poisoned".to_string()))?;
                f(&mut tracker, db)
            })
            .await
    }

    pub async fn start_new_session(&self) -> Result<Session, WorkoutLogError> {
        self.start_new_session_at(Utc::now()).await
    }

    pub async fn start_new_session_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Session, WorkoutLogError> {
        self.update(move |tracker, db| tracker.start_new_session_at(db, now).cloned())
            .await
    }

    pub async fn record_activity(
        &self,
        exercise_name: &str,
        reps: i64,
        weight: f64,
    ) -> Result<ActivityRecord, WorkoutLogError> {
        self.record_activity_at(exercise_name, reps, weight, Utc::now())
            .await
    }

    pub async fn record_activity_at(
        &self,
        exercise_name: &str,
        reps: i64,
        weight: f64,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, WorkoutLogError> {
        let exercise_name = exercise_name.to_string();
        self.update(move |tracker, db| {
            tracker.record_activity_at(db, &exercise_name, reps, weight, now)
        })
        .await
    }

    pub async fn session_history(&self) -> Result<Vec<ActivityRecord>, WorkoutLogError> {
        self.update(|tracker, _| Ok(tracker.session_history().to_vec()))
            .await
    }

    pub async fn session_personal_best(
        &self,
        exercise_name: &str,
    ) -> Result<Option<ActivityRecord>, WorkoutLogError> {
        let exercise_name = exercise_name.to_string();
        self.update(move |tracker, db| {
            Ok(tracker
                .session_personal_best(db, &exercise_name)?
                .cloned())
        })
        .await
    }

    pub async fn all_time_personal_best(
        &self,
        exercise_name: &str,
    ) -> Result<Option<ActivityRecord>, WorkoutLogError> {
        Ok(self.db.personal_best(exercise_name).await?)
    }

    pub async fn total_reps(&self, exercise_name: &str) -> Result<u64, WorkoutLogError> {
        let exercise_name = exercise_name.to_string();
        self.update(move |tracker, db| tracker.total_reps(db, &exercise_name))
            .await
    }

    pub async fn average_weight(&self, exercise_name: &str) -> Result<f64, WorkoutLogError> {
        let exercise_name = exercise_name.to_string();
        self.update(move |tracker, db| tracker.average_weight(db, &exercise_name))
            .await
    }

    pub async fn end_session(&self) -> Result<Session, WorkoutLogError> {
        self.end_session_at(Utc::now()).await
    }

    pub async fn end_session_at(&self, now: DateTime<Utc>) -> Result<Session, WorkoutLogError> {
        self.update(move |tracker, db| tracker.end_session_at(db, now))
            .await
    }

    pub async fn session_duration(&self) -> Result<Option<Duration>, WorkoutLogError> {
        self.update(|tracker, _| Ok(tracker.session_duration()))
            .await
    }

    pub async fn current_session(&self) -> Result<Option<Session>, WorkoutLogError> {
        self.update(|tracker, _| Ok(tracker.current_session().cloned()))
            .await
    }
}
