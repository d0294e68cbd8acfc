use std::cmp::Ordering;
use tracing::{debug, info};

use crate::domain::OrganizationRecord;
use crate::geo::GeoResolver;
use crate::pipeline::ingestion::AssembledPart;
use crate::pipeline::processing::columns::ColumnPresence;
use crate::pipeline::processing::normalize::{Normalizer, SchemaMapper};

/// Result of merging all parts into the master dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<OrganizationRecord>,
    /// Record fields sourced from a column of at least one part
    pub columns: ColumnPresence,
    /// Rows mapped across all parts, before retention
    pub assembled: usize,
    /// Rows dropped for lacking a recognized care type
    pub discarded: usize,
}

/// Concatenates assembled parts into one ordered set of records
#[derive(Debug, Clone, Default)]
pub struct MasterMerger<N: Normalizer = SchemaMapper> {
    normalizer: N,
}

impl<N: Normalizer> MasterMerger<N> {
    pub fn new(normalizer: N) -> Self {
        Self { normalizer }
    }

    pub fn merge(&self, parts: &[AssembledPart], resolver: &GeoResolver<'_>) -> MergeOutcome {
        let mut assembled = 0;
        let mut records = Vec::new();
        let mut columns = ColumnPresence::default();

        for part in parts {
            columns.extend(&self.normalizer.present_columns(&part.columns));
            for row in &part.rows {
                assembled += 1;
                let mut record = self.normalizer.normalize(row, part.index);
                assign_province(&mut record, resolver);
                if record.has_recognized_care_type() {
                    records.push(record);
                }
            }
            debug!(part = part.index, rows = part.rows.len(), "Merged part");
        }

        sort_by_revenue(&mut records);
        let discarded = assembled - records.len();
        info!(assembled, retained = records.len(), discarded, "Merged master dataset");

        MergeOutcome {
            records,
            columns,
            assembled,
            discarded,
        }
    }
}

/// Province from the record's postal code; unknown postal code keeps it unknown
pub fn assign_province(record: &mut OrganizationRecord, resolver: &GeoResolver<'_>) {
    record.province = record
        .postal_code
        .as_deref()
        .and_then(|pc| resolver.resolve_province(pc));
}

/// Stable sort: known revenue descending, then unknown revenue in input order
pub fn sort_by_revenue(records: &mut [OrganizationRecord]) {
    records.sort_by(|a, b| match (a.revenue, b.revenue) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoLookupTable;
    use crate::types::{CellValue, RawRow};

    fn row(code: &str, vvt: &str, revenue: Option<f64>, postal: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("Code".to_string(), CellValue::Text(code.to_string()));
        row.insert("qTypeWTZaZorg_13".to_string(), CellValue::Text(vvt.to_string()));
        row.insert("PostalCode".to_string(), CellValue::Text(postal.to_string()));
        if let Some(r) = revenue {
            row.insert("qTotaalBaten_0".to_string(), CellValue::Number(r));
        }
        row
    }

    fn merge(parts: &[AssembledPart]) -> MergeOutcome {
        let table = GeoLookupTable::empty();
        MasterMerger::new(SchemaMapper::default()).merge(parts, &GeoResolver::new(&table))
    }

    fn codes(records: &[OrganizationRecord]) -> Vec<&str> {
        records.iter().filter_map(|r| r.code.as_deref()).collect()
    }

    #[test]
    fn test_retention_and_counts() {
        let parts = vec![
            AssembledPart::from_rows(
                1,
                vec![row("A", "ja", Some(1.0), "3511"), row("B", "nee", Some(9.0), "3511")],
            ),
            AssembledPart::from_rows(
                2,
                vec![row("C", "onbekend", None, "3511"), row("D", "ja", None, "")],
            ),
        ];

        let outcome = merge(&parts);

        assert_eq!(codes(&outcome.records), vec!["A", "D"]);
        assert_eq!(outcome.assembled, 4);
        assert_eq!(outcome.discarded, 2);
        assert!(outcome.records.iter().all(|r| r.has_recognized_care_type()));
        assert_eq!(outcome.records[0].province.as_deref(), Some("Utrecht"));
        assert_eq!(outcome.records[1].province, None);
        assert_eq!(outcome.records[1].source_part, 2);
        assert!(outcome.columns.revenue());
        assert!(outcome.columns.care_type(crate::domain::CareType::Vvt));
        assert!(!outcome.columns.fte());
    }

    #[test]
    fn test_sort_is_descending_with_unknown_last_and_stable() {
        let parts = vec![AssembledPart::from_rows(
            1,
            vec![
                row("U1", "ja", None, ""),
                row("Low", "ja", Some(10.0), ""),
                row("U2", "ja", None, ""),
                row("High", "ja", Some(500.0), ""),
                row("TieA", "ja", Some(50.0), ""),
                row("TieB", "ja", Some(50.0), ""),
            ],
        )];

        let outcome = merge(&parts);

        assert_eq!(
            codes(&outcome.records),
            vec!["High", "TieA", "TieB", "Low", "U1", "U2"]
        );
    }

    #[test]
    fn test_codes_may_repeat_across_parts() {
        let parts = vec![
            AssembledPart::from_rows(1, vec![row("X", "ja", Some(2.0), "")]),
            AssembledPart::from_rows(2, vec![row("X", "ja", Some(1.0), "")]),
        ];

        let outcome = merge(&parts);
        let parts_seen: Vec<usize> = outcome.records.iter().map(|r| r.source_part).collect();
        assert_eq!(parts_seen, vec![1, 2]);
    }
}
