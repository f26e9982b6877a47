//! Workout sessions: the time interval activity records are grouped under.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// A bounded workout interval.
///
/// A session is open until `ended_at` is set. Sessions created by the bulk
/// importer carry the calendar day they stand for in `day_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_key: Option<String>,
}

impl Session {
    /// Returns true while no end time has been recorded.
    pub const fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Returns true for synthetic sessions created by a bulk import.
    pub const fn is_imported(&self) -> bool {
        self.day_key.is_some()
    }

    /// Elapsed time between start and end, once the session has ended.
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}
