//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for user-supplied workout data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Repetitions must be a positive count.
    #[error("reps must be positive, got {value}")]
    NonPositiveReps { value: i64 },

    /// Repetitions exceed what a single set can hold.
    #[error("reps out of range: {value}")]
    RepsOutOfRange { value: i64 },

    /// Weight must be a positive, finite number.
    #[error("weight must be positive, got {value}")]
    NonPositiveWeight { value: f64 },
}

/// Generates an integer row ID newtype with common trait implementations.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row ID.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row ID.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_row_id!(
    /// Stable identifier of a catalog exercise.
    ExerciseId
);

define_row_id!(
    /// Identifier of a workout session.
    SessionId
);

define_row_id!(
    /// Identifier of a stored activity record.
    ActivityRecordId
);

define_row_id!(
    /// Identifier of a named workout template.
    WorkoutId
);

/// Validates an exercise display name, returning it trimmed.
pub fn validate_exercise_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: "exercise name",
        });
    }
    Ok(trimmed)
}

/// Validates a repetition count.
pub fn validate_reps(reps: i64) -> Result<u32, ValidationError> {
    if reps <= 0 {
        return Err(ValidationError::NonPositiveReps { value: reps });
    }
    u32::try_from(reps).map_err(|_| ValidationError::RepsOutOfRange { value: reps })
}

/// Validates a lifted weight in kilograms.
pub fn validate_weight(weight: f64) -> Result<f64, ValidationError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ValidationError::NonPositiveWeight { value: weight });
    }
    Ok(weight)
}
