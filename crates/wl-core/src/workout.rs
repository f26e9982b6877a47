//! Named workout templates: ordered lists of exercises.

use serde::{Deserialize, Serialize};

use crate::types::WorkoutId;

/// A named workout template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
}
