//! Import command for loading exported workout CSV files.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use wl_db::{Database, ImportSummary, Importer};

pub fn run<W, Tz>(
    writer: &mut W,
    db: &mut Database,
    path: &Path,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<ImportSummary>
where
    W: Write,
    Tz: TimeZone,
{
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    import_from(writer, db, BufReader::new(file), tz, now)
        .with_context(|| format!("failed to import {}", path.display()))
}

fn import_from<W, R, Tz>(
    writer: &mut W,
    db: &mut Database,
    reader: R,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<ImportSummary>
where
    W: Write,
    R: BufRead,
    Tz: TimeZone,
{
    let summary = Importer::new(db, tz).import_reader_at(reader, now)?;

    writeln!(
        writer,
        "Imported {} sets, skipped {} rows.",
        summary.imported,
        summary.skipped.len()
    )?;
    for skipped in &summary.skipped {
        writeln!(writer, "  line {}: {}", skipped.line, skipped.reason)?;
    }
    if summary.undated > 0 {
        writeln!(
            writer,
            "{} rows had no readable date and were stamped with the import time.",
            summary.undated
        )?;
    }
    Ok(summary)
}
