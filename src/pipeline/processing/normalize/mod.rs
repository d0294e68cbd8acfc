pub mod schema;

use std::collections::HashSet;

use crate::constants::PRIMARY_SHEET;
use crate::domain::OrganizationRecord;
use crate::pipeline::processing::columns::ColumnPresence;
use crate::types::RawRow;

pub use schema::{default_mappings, Field, FieldMapping, FieldValue, Transform};

/// Trait for normalizing joined source rows into the canonical record shape
pub trait Normalizer {
    /// Map one joined row to a record tagged with its source part.
    /// Never fails: missing or malformed data becomes unknown.
    fn normalize(&self, row: &RawRow, source_part: usize) -> OrganizationRecord;

    /// Record fields that have a source among the given input columns
    fn present_columns(&self, source_columns: &HashSet<String>) -> ColumnPresence;
}

/// Table-driven normalizer: every mapping is applied by the same routine
#[derive(Debug, Clone)]
pub struct SchemaMapper {
    mappings: Vec<FieldMapping>,
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new(default_mappings())
    }
}

impl SchemaMapper {
    pub fn new(mappings: Vec<FieldMapping>) -> Self {
        Self { mappings }
    }

    /// Reads rows keyed by record column name, as in an exported master file
    pub fn for_master_file() -> Self {
        Self::new(
            Field::ALL
                .into_iter()
                .map(|f| FieldMapping::new(f, PRIMARY_SHEET, f.record_column()))
                .collect(),
        )
    }
}

impl Normalizer for SchemaMapper {
    fn normalize(&self, row: &RawRow, source_part: usize) -> OrganizationRecord {
        let mut record = OrganizationRecord {
            source_part,
            ..Default::default()
        };
        for mapping in &self.mappings {
            let value = mapping.extract(row);
            mapping.field.assign(&mut record, value);
        }
        record
    }

    fn present_columns(&self, source_columns: &HashSet<String>) -> ColumnPresence {
        ColumnPresence::new(
            self.mappings
                .iter()
                .filter(|m| source_columns.contains(&m.column))
                .map(|m| m.field),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_normalize_full_row() {
        let mapper = SchemaMapper::default();
        let raw = row(&[
            ("Code", CellValue::Number(1001.0)),
            ("Name", CellValue::Text("Zorggroep Noord ".to_string())),
            ("qNawKvk", CellValue::Number(12345678.0)),
            ("PostalCode", CellValue::Text("9712 AB".to_string())),
            ("qTypeWTZaZorg_13", CellValue::Text("ja".to_string())),
            ("qTypeWTZaZorg_8", CellValue::Text("nee".to_string())),
            ("qTotaalBaten_0", CellValue::Number(12_000_000.0)),
            ("qPersTotTot_AantalFte", CellValue::Text("200,5".to_string())),
        ]);

        let record = mapper.normalize(&raw, 2);

        assert_eq!(record.source_part, 2);
        assert_eq!(record.code.as_deref(), Some("1001"));
        assert_eq!(record.name.as_deref(), Some("Zorggroep Noord"));
        assert_eq!(record.kvk.as_deref(), Some("12345678"));
        assert_eq!(record.postal_code.as_deref(), Some("9712 AB"));
        assert_eq!(record.is_vvt, Some(true));
        assert_eq!(record.is_ggz, Some(false));
        assert_eq!(record.is_ghz, None);
        assert_eq!(record.revenue, Some(12_000_000.0));
        assert_eq!(record.fte_total, Some(200.5));
        assert_eq!(record.vacancies, None);
    }

    #[test]
    fn test_empty_row_is_all_unknown() {
        let record = SchemaMapper::default().normalize(&RawRow::new(), 1);
        assert_eq!(
            record,
            OrganizationRecord {
                source_part: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_custom_table_overrides_columns() {
        let mapper = SchemaMapper::new(vec![FieldMapping::new(Field::Name, "RowData_01", "Naam")]);
        let raw = row(&[
            ("Naam", CellValue::Text("Thuiszorg West".to_string())),
            ("Name", CellValue::Text("ignored".to_string())),
        ]);
        assert_eq!(mapper.normalize(&raw, 1).name.as_deref(), Some("Thuiszorg West"));
    }

    #[test]
    fn test_present_columns_follow_source_headers() {
        let columns: HashSet<String> = ["Code", "qTotaalBaten_0", "qPersTotTot_AantalFte", "x"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let presence = SchemaMapper::default().present_columns(&columns);

        assert_eq!(
            presence,
            ColumnPresence::new([Field::Code, Field::Revenue, Field::FteTotal])
        );
        assert!(!presence.growth());
    }

    #[test]
    fn test_master_file_mapper_reads_record_columns() {
        let raw = row(&[
            ("code", CellValue::Text("A1".to_string())),
            ("is_vvt", CellValue::Bool(true)),
            ("revenue", CellValue::Text("n.v.t.".to_string())),
            ("fte_total", CellValue::Text("12,5".to_string())),
        ]);
        let record = SchemaMapper::for_master_file().normalize(&raw, 0);

        assert_eq!(record.code.as_deref(), Some("A1"));
        assert_eq!(record.is_vvt, Some(true));
        assert_eq!(record.revenue, None);
        assert_eq!(record.fte_total, Some(12.5));
    }
}
