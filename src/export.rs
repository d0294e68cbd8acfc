//! Flat CSV export of records and re-import of an exported master file.

use chrono::{DateTime, TimeZone};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::domain::OrganizationRecord;
use crate::error::{ProspectError, Result};
use crate::pipeline::processing::{ColumnPresence, Normalizer, SchemaMapper};
use crate::types::{CellValue, RawRow};

const SOURCE_PART_COLUMN: &str = "source_part";

/// `DigiMV_Export_YYYYMMDD_HHMM.csv` for the given moment
pub fn default_export_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("DigiMV_Export_%Y%m%d_%H%M.csv").to_string()
}

/// Column names of the export, in record field order
pub fn column_names() -> Result<Vec<String>> {
    let mut header_writer = csv::Writer::from_writer(Vec::new());
    header_writer.serialize(OrganizationRecord::default())?;
    let bytes = header_writer
        .into_inner()
        .map_err(|e| ProspectError::Io(e.into_error()))?;

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    Ok(reader.headers()?.iter().map(String::from).collect())
}

/// Writes a header row and one line per record, without an index column.
/// Returns the number of records written.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a OrganizationRecord>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(column_names()?)?;

    let mut written = 0;
    for record in records {
        csv_writer.serialize(record)?;
        written += 1;
    }
    csv_writer.flush()?;
    Ok(written)
}

pub fn export_to_path<'a, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a OrganizationRecord>,
{
    let file = File::create(path)?;
    let written = write_csv(file, records)?;
    info!(path = %path.display(), records = written, "Exported records");
    Ok(written)
}

/// Source records of a previously exported master file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterFile {
    pub records: Vec<OrganizationRecord>,
    /// Source fields the file has a header for
    pub columns: ColumnPresence,
}

/// Reads a previously exported master file.
///
/// Only source fields are read; derived columns are recomputed on
/// re-enrichment. Missing columns and unparseable values become unknown,
/// unrecognized columns are ignored.
pub fn read_master_csv<R: Read>(reader: R) -> Result<MasterFile> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let source_part_index = headers.iter().position(|h| h == SOURCE_PART_COLUMN);
    let mapper = SchemaMapper::for_master_file();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let raw: RawRow = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), master_cell(value)))
            .collect();
        let source_part = source_part_index
            .and_then(|i| row.get(i))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        records.push(mapper.normalize(&raw, source_part));
    }

    Ok(MasterFile {
        records,
        columns: ColumnPresence::from_record_columns(headers.iter()),
    })
}

fn master_cell(value: &str) -> CellValue {
    match value {
        "" => CellValue::Empty,
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        other => CellValue::Text(other.to_string()),
    }
}
