//! Aggregates over a slice of activity records.

use std::cmp::Ordering;

use crate::activity::ActivityRecord;
use crate::types::ExerciseId;

/// Orders records by personal-best rank: heavier first, then most recent,
/// then the later-inserted row.
pub fn compare_best(a: &ActivityRecord, b: &ActivityRecord) -> Ordering {
    a.weight
        .total_cmp(&b.weight)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Heaviest set of an exercise among `records`.
pub fn personal_best(
    records: &[ActivityRecord],
    exercise_id: ExerciseId,
) -> Option<&ActivityRecord> {
    records
        .iter()
        .filter(|record| record.exercise_id == exercise_id)
        .max_by(|a, b| compare_best(a, b))
}

/// Sum of reps for an exercise; 0 when nothing matches.
pub fn total_reps(records: &[ActivityRecord], exercise_id: ExerciseId) -> u64 {
    records
        .iter()
        .filter(|record| record.exercise_id == exercise_id)
        .map(|record| u64::from(record.reps))
        .sum()
}

/// Mean weight for an exercise; 0.0 when nothing matches.
#[expect(
    clippy::cast_precision_loss,
    reason = "set counts stay far below 2^52"
)]
pub fn average_weight(records: &[ActivityRecord], exercise_id: ExerciseId) -> f64 {
    let (sum, count) = records
        .iter()
        .filter(|record| record.exercise_id == exercise_id)
        .fold((0.0, 0usize), |(sum, count), record| {
            (sum + record.weight, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Per-exercise summary of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub exercise_id: ExerciseId,
    pub sets: usize,
    pub total_reps: u64,
    pub average_weight: f64,
    pub best_weight: f64,
}

/// Summarizes every exercise in `records`, in order of first appearance.
pub fn summarize(records: &[ActivityRecord]) -> Vec<ExerciseSummary> {
    let mut order: Vec<ExerciseId> = Vec::new();
    for record in records {
        if !order.contains(&record.exercise_id) {
            order.push(record.exercise_id);
        }
    }
    order
        .into_iter()
        .map(|exercise_id| ExerciseSummary {
            exercise_id,
            sets: records
                .iter()
                .filter(|record| record.exercise_id == exercise_id)
                .count(),
            total_reps: total_reps(records, exercise_id),
            average_weight: average_weight(records, exercise_id),
            best_weight: personal_best(records, exercise_id).map_or(0.0, |best| best.weight),
        })
        .collect()
}
