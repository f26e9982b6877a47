//! Session registry.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use wl_core::calendar::{from_millis, truncate_to_millis};
use wl_core::{Session, SessionId};

use crate::{Database, DbError};

const SESSION_COLUMNS: &str = "id, start_timestamp, end_timestamp, day_key";

impl Database {
    /// Creates an open session starting at `started_at`.
    pub fn start_session(&mut self, started_at: DateTime<Utc>) -> Result<Session, DbError> {
        let started_at = truncate_to_millis(started_at);
        self.conn.execute(
            "INSERT INTO session (start_timestamp, end_timestamp) VALUES (?, NULL)",
            [started_at.timestamp_millis()],
        )?;
        let id = SessionId::new(self.conn.last_insert_rowid());
        tracing::info!(session_id = %id, %started_at, "started session");
        Ok(Session {
            id,
            started_at,
            ended_at: None,
            day_key: None,
        })
    }

    /// Records the end time of a session.
    ///
    /// Returns `false` when no session has that ID.
    pub fn end_session(&mut self, id: SessionId, ended_at: DateTime<Utc>) -> Result<bool, DbError> {
        let ended_at = truncate_to_millis(ended_at);
        let updated = self.conn.execute(
            "UPDATE session SET end_timestamp = ? WHERE id = ?",
            params![ended_at.timestamp_millis(), id.get()],
        )?;
        if updated == 0 {
            tracing::warn!(session_id = %id, "cannot end unknown session");
        } else {
            tracing::info!(session_id = %id, %ended_at, "ended session");
        }
        Ok(updated == 1)
    }

    /// Fetches a session by ID.
    pub fn session(&self, id: SessionId) -> Result<Option<Session>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM session WHERE id = ?"),
                [id.get()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    /// The most recently started live session that has not ended yet.
    pub fn latest_open_session(&self) -> Result<Option<Session>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "
                    SELECT {SESSION_COLUMNS}
                    FROM session
                    WHERE end_timestamp IS NULL AND day_key IS NULL
                    ORDER BY start_timestamp DESC, id DESC
                    LIMIT 1
                    "
                ),
                [],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    /// Lists all sessions, most recently started first.
    pub fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM session ORDER BY start_timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], SessionRow::from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Returns the imported session standing for calendar day `day_key`,
    /// creating it with the given bounds if needed.
    pub fn day_session(
        &mut self,
        day_key: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<SessionId, DbError> {
        let id: i64 = self.conn.query_row(
            "
            INSERT INTO session (start_timestamp, end_timestamp, day_key) VALUES (?, ?, ?)
            ON CONFLICT(day_key) DO UPDATE SET day_key = excluded.day_key
            RETURNING id
            ",
            params![
                day_start.timestamp_millis(),
                day_end.timestamp_millis(),
                day_key
            ],
            |row| row.get(0),
        )?;
        Ok(SessionId::new(id))
    }
}

struct SessionRow {
    id: i64,
    start: i64,
    end: Option<i64>,
    day_key: Option<String>,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start: row.get(1)?,
            end: row.get(2)?,
            day_key: row.get(3)?,
        })
    }

    fn into_session(self) -> Result<Session, DbError> {
        let invalid = |millis| DbError::InvalidTimestamp {
            table: "session",
            id: self.id,
            millis,
        };
        let started_at = from_millis(self.start).ok_or_else(|| invalid(self.start))?;
        let ended_at = match self.end {
            Some(millis) => Some(from_millis(millis).ok_or_else(|| invalid(millis))?),
            None => None,
        };
        Ok(Session {
            id: SessionId::new(self.id),
            started_at,
            ended_at,
            day_key: self.day_key,
        })
    }
}
