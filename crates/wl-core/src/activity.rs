//! Activity records: one logged set of an exercise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ActivityRecordId, ExerciseId, SessionId, ValidationError, validate_exercise_name,
    validate_reps, validate_weight,
};

/// A stored set: reps at a weight for one exercise, within one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityRecordId,
    pub exercise_id: ExerciseId,
    pub session_id: SessionId,
    pub reps: u32,
    /// Weight in kilograms.
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

/// A set ready to be written to the activity log.
///
/// Exercise and session must already exist; the store does not check reps or
/// weight, so construct this from a validated [`ActivityInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub exercise_id: ExerciseId,
    pub session_id: SessionId,
    pub reps: u32,
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

impl NewActivity {
    /// Attaches the row ID assigned on insertion.
    pub fn into_record(self, id: ActivityRecordId) -> ActivityRecord {
        ActivityRecord {
            id,
            exercise_id: self.exercise_id,
            session_id: self.session_id,
            reps: self.reps,
            weight: self.weight,
            timestamp: self.timestamp,
        }
    }
}

/// User input for a set, validated at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityInput {
    exercise_name: String,
    reps: u32,
    weight: f64,
}

impl ActivityInput {
    /// Validates a set as entered by the user.
    pub fn new(exercise_name: &str, reps: i64, weight: f64) -> Result<Self, ValidationError> {
        let exercise_name = validate_exercise_name(exercise_name)?.to_string();
        let reps = validate_reps(reps)?;
        let weight = validate_weight(weight)?;
        Ok(Self {
            exercise_name,
            reps,
            weight,
        })
    }

    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    pub const fn reps(&self) -> u32 {
        self.reps
    }

    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Binds the input to resolved identifiers and a timestamp.
    pub const fn bind(
        &self,
        exercise_id: ExerciseId,
        session_id: SessionId,
        timestamp: DateTime<Utc>,
    ) -> NewActivity {
        NewActivity {
            exercise_id,
            session_id,
            reps: self.reps,
            weight: self.weight,
            timestamp,
        }
    }
}

/// An activity record joined with its exercise display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub exercise_name: String,
    #[serde(flatten)]
    pub record: ActivityRecord,
}
