//! Core domain logic for the workout log.
//!
//! This crate contains the fundamental types and logic for:
//! - Catalog exercises, workout sessions and logged sets
//! - Validation of user-entered sets
//! - Session aggregates: total reps, average weight, personal best
//! - Calendar-day bounds and bulk-import row parsing
//! - Workout templates

pub mod activity;
pub mod calendar;
pub mod exercise;
pub mod import;
pub mod session;
pub mod stats;
pub mod types;
pub mod workout;

pub use activity::{ActivityInput, ActivityRecord, HistoryEntry, NewActivity};
pub use exercise::{Exercise, FACTORY_EXERCISES, VOLUME_GROUPS};
pub use import::{ImportRow, ImportRowError};
pub use session::Session;
pub use stats::ExerciseSummary;
pub use types::{ActivityRecordId, ExerciseId, SessionId, ValidationError, WorkoutId};
pub use workout::Workout;
