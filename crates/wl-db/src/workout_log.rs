//! The workout log service: an active session plus a validated recording
//! surface over the catalog and the activity log.
//!
//! Every recorded set is written to the database before it is appended to
//! the in-memory session history, so the history is a cache of durable rows
//! and never holds a set the store rejected.
//!
//! [`SessionTracker`] holds the session state and takes the database per
//! call. [`WorkoutLog`] pairs a tracker with a borrowed [`Database`] for
//! synchronous callers; [`SharedWorkoutLog`](crate::SharedWorkoutLog) pairs
//! one with a [`SharedDatabase`](crate::SharedDatabase).

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use wl_core::calendar::truncate_to_millis;
use wl_core::{ActivityInput, ActivityRecord, Session, SessionId, ValidationError, stats};

use crate::{Database, DbError};

#[derive(Debug, Error)]
pub enum WorkoutLogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no session has been started")]
    NoActiveSession,
    #[error("session {session_id} has already ended")]
    SessionEnded { session_id: SessionId },
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Default, PartialEq)]
enum SessionState {
    #[default]
    Idle,
    Active(Session),
    Ended(Session),
}

/// Session state and history of a workout log.
///
/// Starts idle. [`start_new_session_at`](Self::start_new_session_at) makes a
/// session active, [`end_session_at`](Self::end_session_at) closes it, and
/// starting again moves on to a fresh session. Sets can only be recorded
/// while a session is active.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    state: SessionState,
    history: Vec<ActivityRecord>,
}

impl SessionTracker {
    /// Continues the most recent open session, if any.
    ///
    /// Sessions produced by the importer are never resumed.
    pub fn resume(db: &Database) -> Result<Self, WorkoutLogError> {
        let Some(session) = db.latest_open_session()? else {
            return Ok(Self::default());
        };
        let history = db.activities_for_session(session.id)?;
        tracing::debug!(session_id = %session.id, sets = history.len(), "resumed session");
        Ok(Self {
            state: SessionState::Active(session),
            history,
        })
    }

    /// Starts a fresh session and clears the session history.
    ///
    /// A session that is still active is ended at `now` first.
    pub fn start_new_session_at(
        &mut self,
        db: &mut Database,
        now: DateTime<Utc>,
    ) -> Result<&Session, WorkoutLogError> {
        if let SessionState::Active(current) = &self.state {
            tracing::info!(
                session_id = %current.id,
                "ending active session before starting a new one"
            );
            self.end_session_at(db, now)?;
        }
        let session = db.start_session(now)?;
        self.history.clear();
        self.state = SessionState::Active(session);
        self.active_session()
    }

    /// Validates and records one set in the active session.
    ///
    /// Unknown exercise names are added to the catalog in the same
    /// transaction as the record. On any error the session history is left
    /// unchanged.
    pub fn record_activity_at(
        &mut self,
        db: &mut Database,
        exercise_name: &str,
        reps: i64,
        weight: f64,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, WorkoutLogError> {
        let input = ActivityInput::new(exercise_name, reps, weight).inspect_err(|err| {
            tracing::warn!(exercise_name, reps, weight, %err, "rejected set");
        })?;
        let session_id = self.active_session()?.id;

        let record = db.insert_activity_for_name(
            input.exercise_name(),
            session_id,
            input.reps(),
            input.weight(),
            truncate_to_millis(now),
        )?;

        tracing::info!(
            session_id = %session_id,
            exercise = input.exercise_name(),
            reps = record.reps,
            weight = record.weight,
            "recorded set"
        );
        self.history.push(record.clone());
        Ok(record)
    }

    /// Records of the current session, in the order they were logged.
    pub fn session_history(&self) -> &[ActivityRecord] {
        &self.history
    }

    /// Heaviest set of an exercise within the current session.
    pub fn session_personal_best(
        &self,
        db: &Database,
        exercise_name: &str,
    ) -> Result<Option<&ActivityRecord>, WorkoutLogError> {
        Ok(db
            .exercise_id_by_name(exercise_name)?
            .and_then(|id| stats::personal_best(&self.history, id)))
    }

    /// Total reps of an exercise in the current session; 0 if unknown.
    pub fn total_reps(&self, db: &Database, exercise_name: &str) -> Result<u64, WorkoutLogError> {
        Ok(db
            .exercise_id_by_name(exercise_name)?
            .map_or(0, |id| stats::total_reps(&self.history, id)))
    }

    /// Mean weight of an exercise in the current session; 0.0 if none.
    pub fn average_weight(
        &self,
        db: &Database,
        exercise_name: &str,
    ) -> Result<f64, WorkoutLogError> {
        Ok(db
            .exercise_id_by_name(exercise_name)?
            .map_or(0.0, |id| stats::average_weight(&self.history, id)))
    }

    /// Ends the active session. The history stays queryable until the next
    /// session starts.
    pub fn end_session_at(
        &mut self,
        db: &mut Database,
        now: DateTime<Utc>,
    ) -> Result<Session, WorkoutLogError> {
        let mut session = self.active_session()?.clone();
        let ended_at = truncate_to_millis(now);
        if !db.end_session(session.id, ended_at)? {
            tracing::warn!(session_id = %session.id, "active session missing from database");
        }
        session.ended_at = Some(ended_at);
        self.state = SessionState::Ended(session.clone());
        Ok(session)
    }

    /// Time between start and end of the current session, once it has ended.
    pub fn session_duration(&self) -> Option<Duration> {
        match &self.state {
            SessionState::Ended(session) => session.duration(),
            SessionState::Idle | SessionState::Active(_) => None,
        }
    }

    /// The active or just-ended session.
    pub const fn current_session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Active(session) | SessionState::Ended(session) => Some(session),
            SessionState::Idle => None,
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    fn active_session(&self) -> Result<&Session, WorkoutLogError> {
        match &self.state {
            SessionState::Active(session) => Ok(session),
            SessionState::Ended(session) => Err(WorkoutLogError::SessionEnded {
                session_id: session.id,
            }),
            SessionState::Idle => Err(WorkoutLogError::NoActiveSession),
        }
    }
}

/// Records sets into one session at a time against a borrowed database.
pub struct WorkoutLog<'db> {
    db: &'db mut Database,
    tracker: SessionTracker,
}

impl<'db> WorkoutLog<'db> {
    /// Creates an idle service.
    pub fn new(db: &'db mut Database) -> Self {
        Self {
            db,
            tracker: SessionTracker::default(),
        }
    }

    /// Creates a service that continues the most recent open session, if any.
    pub fn resume(db: &'db mut Database) -> Result<Self, WorkoutLogError> {
        let tracker = SessionTracker::resume(db)?;
        Ok(Self { db, tracker })
    }

    pub fn start_new_session(&mut self) -> Result<&Session, WorkoutLogError> {
        self.start_new_session_at(Utc::now())
    }

    pub fn start_new_session_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<&Session, WorkoutLogError> {
        self.tracker.start_new_session_at(self.db, now)
    }

    pub fn record_activity(
        &mut self,
        exercise_name: &str,
        reps: i64,
        weight: f64,
    ) -> Result<ActivityRecord, WorkoutLogError> {
        self.record_activity_at(exercise_name, reps, weight, Utc::now())
    }

    pub fn record_activity_at(
        &mut self,
        exercise_name: &str,
        reps: i64,
        weight: f64,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, WorkoutLogError> {
        self.tracker
            .record_activity_at(self.db, exercise_name, reps, weight, now)
    }

    pub fn session_history(&self) -> &[ActivityRecord] {
        self.tracker.session_history()
    }

    pub fn session_personal_best(
        &self,
        exercise_name: &str,
    ) -> Result<Option<&ActivityRecord>, WorkoutLogError> {
        self.tracker.session_personal_best(self.db, exercise_name)
    }

    /// Heaviest set of an exercise across every session.
    pub fn all_time_personal_best(
        &self,
        exercise_name: &str,
    ) -> Result<Option<ActivityRecord>, WorkoutLogError> {
        Ok(self.db.personal_best_by_name(exercise_name)?)
    }

    pub fn total_reps(&self, exercise_name: &str) -> Result<u64, WorkoutLogError> {
        self.tracker.total_reps(self.db, exercise_name)
    }

    pub fn average_weight(&self, exercise_name: &str) -> Result<f64, WorkoutLogError> {
        self.tracker.average_weight(self.db, exercise_name)
    }

    pub fn end_session(&mut self) -> Result<Session, WorkoutLogError> {
        self.end_session_at(Utc::now())
    }

    pub fn end_session_at(&mut self, now: DateTime<Utc>) -> Result<Session, WorkoutLogError> {
        self.tracker.end_session_at(self.db, now)
    }

    pub fn session_duration(&self) -> Option<Duration> {
        self.tracker.session_duration()
    }

    pub const fn current_session(&self) -> Option<&Session> {
        self.tracker.current_session()
    }

    pub const fn is_active(&self) -> bool {
        self.tracker.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn recorded_set_appears_in_history() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session().unwrap();

        let record = log.record_activity("Bench Press", 10, 60.0).unwrap();
        assert_eq!(log.session_history(), std::slice::from_ref(&record));
        assert_eq!(record.reps, 10);
        assert!((record.weight - 60.0).abs() < f64::EPSILON);

        let again = log.record_activity("Bench Press", 8, 62.5).unwrap();
        assert_eq!(again.exercise_id, record.exercise_id);
        assert_eq!(log.session_history().len(), 2);
    }

    #[test]
    fn recorded_sets_are_durable() {
        let mut db = Database::open_in_memory().unwrap();
        let session_id = {
            let mut log = WorkoutLog::new(&mut db);
            let session_id = log.start_new_session().unwrap().id;
            log.record_activity("Squat", 5, 100.0).unwrap();
            session_id
        };
        let stored = db.activities_for_session(session_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            db.exercise_id_by_name("Squat").unwrap(),
            Some(stored[0].exercise_id)
        );
    }

    #[test]
    fn recording_reuses_catalog_entries() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_factory_defaults().unwrap();
        let deadlift = db.exercise_id_by_name("Deadlift").unwrap().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session().unwrap();
        let record = log.record_activity("Deadlift", 3, 140.0).unwrap();
        assert_eq!(record.exercise_id, deadlift);
    }

    #[test]
    fn invalid_sets_leave_history_unchanged() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session().unwrap();
        log.record_activity("Bench Press", 10, 60.0).unwrap();

        let invalid = [
            ("Bench Press", -5, 60.0),
            ("Bench Press", 10, -10.0),
            ("", 10, 60.0),
        ];
        for (name, reps, weight) in invalid {
            let err = log.record_activity(name, reps, weight).unwrap_err();
            assert!(matches!(err, WorkoutLogError::Validation(_)), "{err}");
        }
        assert_eq!(log.session_history().len(), 1);
    }

    #[test]
    fn recording_without_session_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        let err = log.record_activity("Bench Press", 10, 60.0).unwrap_err();
        assert!(matches!(err, WorkoutLogError::NoActiveSession));
        assert!(log.session_history().is_empty());
    }

    #[test]
    fn recording_after_end_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        let session_id = log.start_new_session().unwrap().id;
        log.record_activity("Bench Press", 10, 60.0).unwrap();
        log.end_session().unwrap();

        let err = log.record_activity("Bench Press", 10, 60.0).unwrap_err();
        assert!(
            matches!(err, WorkoutLogError::SessionEnded { session_id: id } if id == session_id)
        );
        assert_eq!(log.session_history().len(), 1);
    }

    #[test]
    fn total_reps_sums_session_sets() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session().unwrap();
        log.record_activity("Bench Press", 10, 100.0).unwrap();
        log.record_activity("Bench Press", 5, 100.0).unwrap();
        log.record_activity("Squat", 3, 120.0).unwrap();
        assert_eq!(log.total_reps("Bench Press").unwrap(), 15);
        assert_eq!(log.total_reps("Curl").unwrap(), 0);
    }

    #[test]
    fn average_weight_is_session_mean() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session().unwrap();
        log.record_activity("Bench Press", 10, 100.0).unwrap();
        log.record_activity("Bench Press", 8, 120.0).unwrap();
        assert!((log.average_weight("Bench Press").unwrap() - 110.0).abs() < 1e-9);
        assert!(log.average_weight("Squat").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn session_and_all_time_bests_differ() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        log.start_new_session_at(at("2025-03-01T09:00:00Z")).unwrap();
        log.record_activity_at("Bench Press", 5, 90.0, at("2025-03-01T09:10:00Z"))
            .unwrap();
        log.end_session_at(at("2025-03-01T10:00:00Z")).unwrap();

        log.start_new_session_at(at("2025-03-03T09:00:00Z")).unwrap();
        log.record_activity_at("Bench Press", 10, 40.0, at("2025-03-03T09:10:00Z"))
            .unwrap();
        let session_best = log
            .record_activity_at("Bench Press", 10, 60.0, at("2025-03-03T09:20:00Z"))
            .unwrap();

        assert_eq!(
            log.session_personal_best("Bench Press").unwrap(),
            Some(&session_best)
        );
        let all_time = log.all_time_personal_best("Bench Press").unwrap().unwrap();
        assert!((all_time.weight - 90.0).abs() < f64::EPSILON);
        assert_eq!(log.session_personal_best("Squat").unwrap(), None);
    }

    #[test]
    fn duration_is_known_only_after_end() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        assert_eq!(log.session_duration(), None);
        log.start_new_session_at(at("2025-03-01T09:00:00Z")).unwrap();
        assert_eq!(log.session_duration(), None);
        log.end_session_at(at("2025-03-01T10:15:00Z")).unwrap();
        assert_eq!(log.session_duration(), Some(Duration::minutes(75)));
        assert!(!log.is_active());
    }

    #[test]
    fn ending_twice_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let mut log = WorkoutLog::new(&mut db);
        assert!(matches!(log.end_session(), Err(WorkoutLogError::NoActiveSession)));
        log.start_new_session().unwrap();
        log.end_session().unwrap();
        assert!(matches!(
            log.end_session(),
            Err(WorkoutLogError::SessionEnded { .. })
        ));
    }

    #[test]
    fn restarting_clears_history_and_closes_previous() {
        let mut db = Database::open_in_memory().unwrap();
        let (first, second) = {
            let mut log = WorkoutLog::new(&mut db);
            let first = log.start_new_session_at(at("2025-03-01T09:00:00Z")).unwrap().id;
            log.record_activity_at("Squat", 5, 100.0, at("2025-03-01T09:05:00Z"))
                .unwrap();
            let second = log.start_new_session_at(at("2025-03-01T11:00:00Z")).unwrap().id;
            assert!(log.session_history().is_empty());
            assert!(log.is_active());
            (first, second)
        };
        assert_ne!(first, second);
        let closed = db.session(first).unwrap().unwrap();
        assert_eq!(closed.ended_at, Some(at("2025-03-01T11:00:00Z")));
    }

    #[test]
    fn resume_reloads_open_session() {
        let mut db = Database::open_in_memory().unwrap();
        let session_id = {
            let mut log = WorkoutLog::new(&mut db);
            let id = log.start_new_session_at(at("2025-03-01T09:00:00Z")).unwrap().id;
            log.record_activity_at("Squat", 5, 100.0, at("2025-03-01T09:05:00Z"))
                .unwrap();
            log.record_activity_at("Squat", 5, 105.0, at("2025-03-01T09:10:00Z"))
                .unwrap();
            id
        };

        let mut log = WorkoutLog::resume(&mut db).unwrap();
        assert_eq!(log.current_session().map(|s| s.id), Some(session_id));
        let weights: Vec<f64> = log.session_history().iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![100.0, 105.0]);
        assert_eq!(log.total_reps("Squat").unwrap(), 10);

        log.end_session().unwrap();
        drop(log);
        let log = WorkoutLog::resume(&mut db).unwrap();
        assert!(log.current_session().is_none());
    }
}
