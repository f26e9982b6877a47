//! Exercise catalog entries and built-in reference data.

use serde::{Deserialize, Serialize};

use crate::types::ExerciseId;

/// Exercises shipped with the application, stored with `factory = true`.
pub const FACTORY_EXERCISES: &[&str] = &[
    "Abdominal Twists",
    "Abmat Crunches",
    "Back Extension",
    "Back Squat",
    "Barbell Chest Squat",
    "Bench Press",
    "Bicep Curl",
    "Bulgarian Split Squat",
    "Cable Side Deltoid Pulls",
    "Deadlift",
    "Dumbell Bench Press",
    "Dumbell Chin Row",
    "Dumbell Side Raises",
    "Dumbell Shoulder Press",
    "Lat Pulldown",
    "Leg Press",
    "Parallel Dips",
    "Pull-Up",
    "Push-Up",
    "Rope Pulls To Face",
    "Seated Row",
    "Trapbar Deadlift",
    "Triceps Extension",
];

/// Muscle volume groups preloaded as reference data.
pub const VOLUME_GROUPS: &[&str] = &[
    "Arms",
    "Back",
    "Biceps",
    "Chest",
    "Hamstrings",
    "Legs",
    "Quads",
    "Triceps",
];

/// A named exercise in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    /// Built-in entries survive a factory reset.
    pub is_factory: bool,
    /// Archived entries are hidden from pickers but keep their history.
    #[serde(default)]
    pub archived: bool,
}
