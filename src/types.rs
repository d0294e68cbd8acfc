use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single spreadsheet cell after decoding from the workbook format
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Trimmed text representation; integral numbers render without a fraction
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) if !n.is_finite() => None,
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Numeric value; text is parsed leniently (decimal comma accepted)
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_decimal(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Canonical key used when joining sheets on the entity code
    pub fn join_key(&self) -> Option<String> {
        self.as_text()
    }
}

/// Parses a decimal that may use a comma as separator ("12,5")
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| {
            if trimmed.contains('.') {
                None
            } else {
                trimmed.replace(',', ".").parse::<f64>().ok()
            }
        })
        .filter(|v| v.is_finite())
}

/// One merged row: column name to cell value
pub type RawRow = HashMap<String, CellValue>;

/// A decoded worksheet: header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

/// One uploaded source file with the sheets the pipeline understands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePart {
    /// 1-based position in upload order
    pub index: usize,
    pub sheets: HashMap<String, RawSheet>,
}
