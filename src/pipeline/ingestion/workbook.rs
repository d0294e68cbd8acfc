use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

use crate::constants::{AUXILIARY_SHEETS, PRIMARY_SHEET};
use crate::error::{ProspectError, Result};
use crate::types::{CellValue, RawSheet, SourcePart};

/// Decodes the bytes of one uploaded part into the sheets the pipeline uses
pub trait PartReader {
    fn read_part(&self, index: usize, bytes: &[u8]) -> Result<SourcePart>;
}

/// Reads `.xlsx`, `.xls` and `.ods` workbooks with calamine
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl PartReader for CalamineReader {
    fn read_part(&self, index: usize, bytes: &[u8]) -> Result<SourcePart> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let mut sheets = HashMap::new();
        for name in workbook.sheet_names() {
            if name != PRIMARY_SHEET && !AUXILIARY_SHEETS.contains(&name.as_str()) {
                continue;
            }
            let range = workbook.worksheet_range(&name)?;
            let mut rows = range.rows();

            let headers = match rows.next() {
                Some(header_row) => header_row
                    .iter()
                    .map(|cell| convert_cell(cell).as_text().unwrap_or_default())
                    .collect(),
                None => Vec::new(),
            };
            let data: Vec<Vec<CellValue>> =
                rows.map(|row| row.iter().map(convert_cell).collect()).collect();

            debug!(part = index, sheet = %name, rows = data.len(), "Decoded sheet");
            sheets.insert(
                name,
                RawSheet {
                    headers,
                    rows: data,
                },
            );
        }

        if sheets.is_empty() {
            return Err(ProspectError::PartSkipped {
                part: index,
                reason: "workbook contains none of the RowData sheets".to_string(),
            });
        }

        Ok(SourcePart { index, sheets })
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}
