//! Bulk import of exported workout rows.
//!
//! Each calendar day found in the input becomes one imported session, keyed
//! by its local date. Import is not atomic: rows are committed one by one and
//! a malformed row is skipped without affecting the rest.

use std::io::BufRead;

use chrono::{DateTime, TimeZone, Utc};
use wl_core::calendar::{day_bounds, day_key, local_date, resolve_local, truncate_to_millis};
use wl_core::{ActivityRecord, ImportRow, ImportRowError};

use crate::{Database, DbError};

/// A row that was not imported.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the input, header included.
    pub line: usize,
    pub reason: ImportRowError,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    /// Rows whose date did not parse and were stamped with the import time.
    pub undated: usize,
}

/// Imports rows into the database, deriving one session per local day.
pub struct Importer<'db, Tz: TimeZone> {
    db: &'db mut Database,
    tz: Tz,
}

impl<'db, Tz: TimeZone> Importer<'db, Tz> {
    /// Creates an importer that interprets row dates in `tz`.
    pub const fn new(db: &'db mut Database, tz: Tz) -> Self {
        Self { db, tz }
    }

    pub fn import_reader<R: BufRead>(&mut self, reader: R) -> Result<ImportSummary, DbError> {
        self.import_reader_at(reader, Utc::now())
    }

    /// Imports every data line of `reader`, skipping the header line.
    ///
    /// Rows that fail to parse, including rows whose read columns are not
    /// valid UTF-8, are recorded in the summary and skipped. I/O and storage
    /// errors abort the import; rows written before the failure stay.
    pub fn import_reader_at<R: BufRead>(
        &mut self,
        mut reader: R,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, DbError> {
        let mut summary = ImportSummary::default();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| DbError::Read {
                    line: line_no + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;
            let line = strip_line_ending(&buf);
            if line_no == 1 || line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let row = match ImportRow::parse_bytes(line) {
                Ok(row) => row,
                Err(reason) => {
                    tracing::warn!(line = line_no, %reason, "skipping import row");
                    summary.skipped.push(SkippedRow {
                        line: line_no,
                        reason,
                    });
                    continue;
                }
            };
            if row.recorded_at.is_none() {
                tracing::warn!(
                    line = line_no,
                    date = %row.date,
                    "unparseable date, using import time"
                );
                summary.undated += 1;
            }
            self.import_row(&row, now)?;
            summary.imported += 1;
        }
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped.len(),
            undated = summary.undated,
            "import finished"
        );
        Ok(summary)
    }

    /// Writes one parsed row into the session for its local day.
    ///
    /// A row without a usable date is stamped with `now`.
    pub fn import_row(
        &mut self,
        row: &ImportRow,
        now: DateTime<Utc>,
    ) -> Result<ActivityRecord, DbError> {
        let timestamp = truncate_to_millis(
            row.recorded_at
                .map_or(now, |naive| resolve_local(naive, &self.tz)),
        );
        let (day_start, day_end) = day_bounds(local_date(timestamp, &self.tz), &self.tz);
        let key = day_key(timestamp, &self.tz);

        let session_id = self.db.day_session(&key, day_start, day_end)?;
        self.db.insert_activity_for_name(
            &row.exercise_name,
            session_id,
            row.reps,
            row.weight,
            timestamp,
        )
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::FixedOffset;
    use wl_core::ValidationError;

    const HEADER: &str = "Date,Workout Name,Exercise Name,Reps,Weight,One Rep Max,Notes,Duration";

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn run(db: &mut Database, body: &str) -> ImportSummary {
        let input = format!("{HEADER}\n{body}");
        Importer::new(db, Utc)
            .import_reader_at(Cursor::new(input), at("2025-06-01T12:00:00Z"))
            .unwrap()
    }

    #[test]
    fn imports_rows_and_skips_header() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = run(
            &mut db,
            "2021-11-18 13:03:57,Weekly Day 2,Trapbar Deadlift,6,67.0,147.71,,0\n\
             2021-11-18 13:10:02,Weekly Day 2,Bench Press,8,50.0,63.3,,0\n",
        );
        assert_eq!(summary.imported, 2);
        assert!(summary.skipped.is_empty());

        let records = db.activities_newest_first().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].timestamp, at("2021-11-18T13:03:57Z"));
        assert!(db.exercise_id_by_name("Date").unwrap().is_none());
        assert!(db.exercise_id_by_name("Trapbar Deadlift").unwrap().is_some());
    }

    #[test]
    fn rows_on_the_same_day_share_a_session() {
        let mut db = Database::open_in_memory().unwrap();
        run(
            &mut db,
            "2021-11-18 08:00:00,A,Squat,5,100\n\
             2021-11-18 20:00:00,A,Squat,5,102.5\n\
             2021-11-19 08:00:00,A,Squat,5,105\n",
        );
        let records = db.activities_newest_first().unwrap();
        assert_eq!(records[1].session_id, records[2].session_id);
        assert_ne!(records[0].session_id, records[1].session_id);

        let session = db.session(records[2].session_id).unwrap().unwrap();
        assert_eq!(session.day_key.as_deref(), Some("2021-11-18"));
        assert_eq!(session.started_at, at("2021-11-18T00:00:00Z"));
        assert_eq!(session.ended_at, Some(at("2021-11-18T23:59:59.999Z")));
    }

    #[test]
    fn reimporting_a_day_reuses_its_session() {
        let mut db = Database::open_in_memory().unwrap();
        run(&mut db, "2021-11-18 08:00:00,A,Squat,5,100\n");
        run(&mut db, "2021-11-18 09:00:00,A,Squat,5,100\n");
        let records = db.activities_newest_first().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].session_id, records[1].session_id);
        assert_eq!(db.list_sessions().unwrap().len(), 1);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = run(
            &mut db,
            "2021-11-18 08:00:00,A,Squat,five,100\n\
             2021-11-18 08:05:00,A\n\
             \n\
             2021-11-18 08:10:00,A,Squat,-3,100\n\
             2021-11-18 08:15:00,A,Squat,5,100\n",
        );
        assert_eq!(summary.imported, 1);
        let lines: Vec<usize> = summary.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![2, 3, 5]);
        assert_eq!(
            summary.skipped[2].reason,
            ImportRowError::Validation(ValidationError::NonPositiveReps { value: -3 })
        );
        assert_eq!(db.activities_newest_first().unwrap().len(), 1);
    }

    #[test]
    fn unparseable_date_uses_import_time() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = run(&mut db, "18/11/2021,A,Squat,5,100\n");
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.undated, 1);

        let records = db.activities_newest_first().unwrap();
        assert_eq!(records[0].timestamp, at("2025-06-01T12:00:00Z"));
        let session = db.session(records[0].session_id).unwrap().unwrap();
        assert_eq!(session.day_key.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn dates_are_local_to_the_importer_zone() {
        let mut db = Database::open_in_memory().unwrap();
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let input = format!("{HEADER}\n2021-11-18 23:30:00,A,Squat,5,100\n");
        Importer::new(&mut db, tz)
            .import_reader_at(Cursor::new(input), at("2025-06-01T12:00:00Z"))
            .unwrap();

        let records = db.activities_newest_first().unwrap();
        let record = &records[0];
        assert_eq!(record.timestamp, at("2021-11-19T04:30:00Z"));
        let session = db.session(record.session_id).unwrap().unwrap();
        assert_eq!(session.day_key.as_deref(), Some("2021-11-18"));
    }

    #[test]
    fn imported_sessions_are_not_resumed() {
        let mut db = Database::open_in_memory().unwrap();
        run(&mut db, "2021-11-18 08:00:00,A,Squat,5,100\n");
        assert_eq!(db.latest_open_session().unwrap(), None);
    }

    #[test]
    fn badly_encoded_rows_do_not_stop_the_import() {
        let mut db = Database::open_in_memory().unwrap();
        let mut input = format!("{HEADER}\r\n").into_bytes();
        input.extend_from_slice(b"2021-11-18 08:00:00,A,Squat,5,100,,,0\r\n");
        input.extend_from_slice(b"2021-11-18 08:05:00,A,Squat,5,102.5,,caf\xe9,0\r\n");
        input.extend_from_slice(b"2021-11-18 08:10:00,A,Caf\xe9 Curl,8,20,,,0\r\n");
        input.extend_from_slice(b"2021-11-18 08:15:00,A,Squat,5,105,,,0\r\n");

        let summary = Importer::new(&mut db, Utc)
            .import_reader_at(Cursor::new(input), at("2025-06-01T12:00:00Z"))
            .unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(
            summary.skipped,
            vec![SkippedRow {
                line: 4,
                reason: ImportRowError::InvalidEncoding { column: 3 },
            }]
        );
        let weights: Vec<f64> = db
            .activities_newest_first()
            .unwrap()
            .iter()
            .map(|record| record.weight)
            .collect();
        assert_eq!(weights, vec![105.0, 102.5, 100.0]);
    }

    #[test]
    fn quoted_columns_import_like_plain_ones() {
        let mut db = Database::open_in_memory().unwrap();
        let summary = run(
            &mut db,
            "2021-11-18 08:00:00,\"Day 2, Heavy\",Squat,5,100,,,0\n\
             \"2021-11-18 08:10:00\",\"Day 2\",\"Bench Press\",\"8\",\"50.0\",\"\",\"\",\"0\"\n",
        );
        assert_eq!(summary.imported, 2);
        assert!(summary.skipped.is_empty());
        assert!(db.exercise_id_by_name("Bench Press").unwrap().is_some());
        assert!(db.exercise_id_by_name("\"Bench Press\"").unwrap().is_none());
    }
}
