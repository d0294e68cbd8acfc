use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::constants::{AUXILIARY_SHEETS, JOIN_KEY, PRIMARY_SHEET};
use crate::error::{ProspectError, Result};
use crate::types::{CellValue, RawRow, RawSheet, SourcePart};

/// Joined rows of one part, tagged with its 1-based index
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPart {
    pub index: usize,
    pub rows: Vec<RawRow>,
    /// Every column that took part in the join, including all-empty ones
    pub columns: HashSet<String>,
}

impl AssembledPart {
    /// Part whose columns are exactly the keys found in its rows
    pub fn from_rows(index: usize, rows: Vec<RawRow>) -> Self {
        let columns = rows.iter().flat_map(|r| r.keys().cloned()).collect();
        Self {
            index,
            rows,
            columns,
        }
    }
}

/// Left-joins the auxiliary sheets of a part onto its primary sheet by `Code`
#[derive(Debug, Clone, Copy, Default)]
pub struct PartAssembler;

impl PartAssembler {
    pub fn assemble(&self, part: &SourcePart) -> Result<AssembledPart> {
        let primary = part
            .sheets
            .get(PRIMARY_SHEET)
            .ok_or_else(|| ProspectError::PartSkipped {
                part: part.index,
                reason: format!("sheet {PRIMARY_SHEET} not found"),
            })?;

        let mut present: HashSet<String> = HashSet::new();
        let mut rows: Vec<RawRow> = Vec::with_capacity(primary.rows.len());
        for cells in &primary.rows {
            if cells.iter().all(|c| *c == CellValue::Empty) {
                continue;
            }
            let mut row = RawRow::new();
            for (header, cell) in primary.headers.iter().zip(cells) {
                if !header.is_empty() {
                    row.entry(header.clone()).or_insert_with(|| cell.clone());
                }
            }
            rows.push(row);
        }
        present.extend(primary.headers.iter().filter(|h| !h.is_empty()).cloned());

        for sheet_name in AUXILIARY_SHEETS {
            let Some(sheet) = part.sheets.get(sheet_name) else {
                continue;
            };
            let Some(key_index) = sheet.column_index(JOIN_KEY) else {
                debug!(part = part.index, sheet = sheet_name, "No key column, sheet ignored");
                continue;
            };
            let added = join_sheet(&mut rows, &present, sheet, key_index);
            debug!(
                part = part.index,
                sheet = sheet_name,
                columns = added.len(),
                "Joined auxiliary sheet"
            );
            present.extend(added);
        }

        Ok(AssembledPart {
            index: part.index,
            rows,
            columns: present,
        })
    }
}

/// Adds the columns of `sheet` not yet in `present` to every row, returning
/// the names of the columns added
fn join_sheet(
    rows: &mut [RawRow],
    present: &HashSet<String>,
    sheet: &RawSheet,
    key_index: usize,
) -> Vec<String> {
    let mut new_columns: Vec<(usize, String)> = Vec::new();
    for (i, header) in sheet.headers.iter().enumerate() {
        if header.is_empty()
            || present.contains(header)
            || new_columns.iter().any(|(_, h)| h == header)
        {
            continue;
        }
        new_columns.push((i, header.clone()));
    }

    // First row per key
    let mut by_key: HashMap<String, &Vec<CellValue>> = HashMap::new();
    for cells in &sheet.rows {
        if let Some(key) = cells.get(key_index).and_then(CellValue::join_key) {
            by_key.entry(key).or_insert(cells);
        }
    }

    for row in rows.iter_mut() {
        let matched = row
            .get(JOIN_KEY)
            .and_then(CellValue::join_key)
            .and_then(|key| by_key.get(&key));
        for (i, header) in &new_columns {
            let value = matched
                .and_then(|cells| cells.get(*i))
                .cloned()
                .unwrap_or_default();
            row.insert(header.clone(), value);
        }
    }

    new_columns.into_iter().map(|(_, h)| h).collect()
}
