//! Parsing of exported workout rows for bulk import.
//!
//! Rows are comma-separated with fixed positions:
//! `date, workout name, exercise name, reps, weight (kg), ...`.
//! The workout name and any trailing columns are ignored, and only the
//! columns that are read need to be valid UTF-8. Fields may be wrapped in
//! double quotes to carry commas; a quoted field cannot span lines.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::types::{ValidationError, validate_exercise_name, validate_reps, validate_weight};

/// Format of the date column, interpreted as local wall-clock time.
pub const IMPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_COLUMN: usize = 0;
const EXERCISE_COLUMN: usize = 2;
const REPS_COLUMN: usize = 3;
const WEIGHT_COLUMN: usize = 4;
const MIN_COLUMNS: usize = WEIGHT_COLUMN + 1;

/// Why a row could not be imported.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImportRowError {
    #[error("expected at least {MIN_COLUMNS} columns, found {found}")]
    TooFewColumns { found: usize },
    /// `column` is 1-based.
    #[error("column {column} is not valid UTF-8")]
    InvalidEncoding { column: usize },
    #[error("reps is not a whole number: {value:?}")]
    InvalidReps { value: String },
    #[error("weight is not a number: {value:?}")]
    InvalidWeight { value: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A validated import row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// Raw date column, kept for diagnostics.
    pub date: String,
    /// Parsed local time, `None` when the date column did not parse.
    pub recorded_at: Option<NaiveDateTime>,
    pub exercise_name: String,
    pub reps: u32,
    pub weight: f64,
}

impl ImportRow {
    /// Parses a single line of text.
    pub fn parse_line(line: &str) -> Result<Self, ImportRowError> {
        Self::parse_bytes(line.as_bytes())
    }

    /// Parses a single line as read from a file, without its line ending.
    pub fn parse_bytes(line: &[u8]) -> Result<Self, ImportRowError> {
        let fields = split_fields(line);
        if fields.len() < MIN_COLUMNS {
            return Err(ImportRowError::TooFewColumns {
                found: fields.len(),
            });
        }
        let column = |idx: usize| {
            std::str::from_utf8(&fields[idx])
                .map_err(|_| ImportRowError::InvalidEncoding { column: idx + 1 })
        };
        Self::from_columns(
            column(DATE_COLUMN)?,
            column(EXERCISE_COLUMN)?,
            column(REPS_COLUMN)?,
            column(WEIGHT_COLUMN)?,
        )
    }

    fn from_columns(
        date: &str,
        exercise_name: &str,
        reps: &str,
        weight: &str,
    ) -> Result<Self, ImportRowError> {
        let date = date.trim();
        let exercise_name = validate_exercise_name(exercise_name)?;

        let reps_raw = reps.trim();
        let reps: i64 = reps_raw.parse().map_err(|_| ImportRowError::InvalidReps {
            value: reps_raw.to_string(),
        })?;

        let weight_raw = weight.trim();
        let weight: f64 = weight_raw
            .parse()
            .map_err(|_| ImportRowError::InvalidWeight {
                value: weight_raw.to_string(),
            })?;

        Ok(Self {
            date: date.to_string(),
            recorded_at: NaiveDateTime::parse_from_str(date, IMPORT_DATE_FORMAT).ok(),
            exercise_name: exercise_name.to_string(),
            reps: validate_reps(reps)?,
            weight: validate_weight(weight)?,
        })
    }
}

/// Splits one line into raw fields.
///
/// A field that starts with `"` runs to the matching closing quote and may
/// contain commas; `""` inside it is a literal quote. An unterminated quote
/// takes the rest of the line.
pub fn split_fields(line: &[u8]) -> Vec<Vec<u8>> {
    let mut fields = Vec::new();
    let mut field = Vec::new();
    let mut quoted = false;
    let mut bytes = line.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'"' if quoted => {
                if bytes.next_if_eq(&b'"').is_some() {
                    field.push(b'"');
                } else {
                    quoted = false;
                }
            }
            b'"' if field.is_empty() => quoted = true,
            b',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(byte),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_row() {
        let row = ImportRow::parse_line(
            "2021-11-18 13:03:57,Weekly Day 2,Trapbar Deadlift,6,67.0,147.71,,0",
        )
        .unwrap();
        assert_eq!(row.exercise_name, "Trapbar Deadlift");
        assert_eq!(row.reps, 6);
        assert!((row.weight - 67.0).abs() < f64::EPSILON);
        assert_eq!(
            row.recorded_at.unwrap().to_string(),
            "2021-11-18 13:03:57"
        );
    }

    #[test]
    fn unparseable_date_is_kept_as_none() {
        let row = ImportRow::parse_line("18/11/2021,Day,Squat,5,100").unwrap();
        assert_eq!(row.date, "18/11/2021");
        assert!(row.recorded_at.is_none());
    }

    #[test]
    fn short_rows_are_rejected() {
        let err = ImportRow::parse_line("2021-11-18 13:03:57,Day,Squat,5").unwrap_err();
        assert_eq!(err, ImportRowError::TooFewColumns { found: 4 });
    }

    #[test]
    fn non_numeric_columns_are_rejected() {
        assert!(matches!(
            ImportRow::parse_line("2021-11-18 13:03:57,Day,Squat,five,100"),
            Err(ImportRowError::InvalidReps { .. })
        ));
        assert!(matches!(
            ImportRow::parse_line("2021-11-18 13:03:57,Day,Squat,5,heavy"),
            Err(ImportRowError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ImportRow::parse_line("2021-11-18 13:03:57,Day,,5,100"),
            Err(ImportRowError::Validation(ValidationError::Empty { .. }))
        ));
        assert!(matches!(
            ImportRow::parse_line("2021-11-18 13:03:57,Day,Squat,0,100"),
            Err(ImportRowError::Validation(
                ValidationError::NonPositiveReps { value: 0 }
            ))
        ));
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let row =
            ImportRow::parse_line(r#"2021-11-18 08:00:00,"Day 2, Heavy",Squat,5,100,,,0"#).unwrap();
        assert_eq!(row.exercise_name, "Squat");
        assert_eq!(row.reps, 5);
    }

    #[test]
    fn fully_quoted_rows_parse() {
        let row = ImportRow::parse_line(
            r#""2021-11-18 13:10:02","Day 2","Bench ""Paused"" Press","8","50.0","","""#,
        )
        .unwrap();
        assert_eq!(row.exercise_name, r#"Bench "Paused" Press"#);
        assert_eq!(row.reps, 8);
        assert!((row.weight - 50.0).abs() < f64::EPSILON);
        assert!(row.recorded_at.is_some());
    }

    #[test]
    fn split_keeps_empty_and_unterminated_fields() {
        assert_eq!(
            split_fields(br#"a,,"b,c"#),
            vec![b"a".to_vec(), Vec::new(), b"b,c".to_vec()]
        );
        assert_eq!(split_fields(b"x\"y"), vec![b"x\"y".to_vec()]);
    }

    #[test]
    fn invalid_utf8_outside_read_columns_is_ignored() {
        let row = ImportRow::parse_bytes(b"2021-11-18 08:00:00,A,Squat,5,100,,caf\xe9,0").unwrap();
        assert_eq!(row.exercise_name, "Squat");
    }

    #[test]
    fn invalid_utf8_in_read_columns_is_rejected() {
        let err = ImportRow::parse_bytes(b"2021-11-18 08:00:00,A,Caf\xe9 Curl,5,100").unwrap_err();
        assert_eq!(err, ImportRowError::InvalidEncoding { column: 3 });
    }
}
