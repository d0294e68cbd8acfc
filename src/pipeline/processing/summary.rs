use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::{CareType, OrganizationRecord};

/// Count of records flagged `true` for one care type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareTypeCount {
    pub care_type: CareType,
    pub label: &'static str,
    pub count: usize,
}

/// Headline statistics over a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub per_care_type: Vec<CareTypeCount>,
    /// Sum of known revenue
    pub total_revenue: f64,
    /// Sum of known total FTE
    pub total_fte: f64,
    pub reliable_fte: usize,
}

impl DatasetSummary {
    pub fn of<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a OrganizationRecord>,
    {
        let mut total = 0;
        let mut counts = [0usize; CareType::ALL.len()];
        let mut total_revenue = 0.0;
        let mut total_fte = 0.0;
        let mut reliable_fte = 0;

        for record in records {
            total += 1;
            for (i, care_type) in CareType::ALL.iter().enumerate() {
                if record.care_type(*care_type) == Some(true) {
                    counts[i] += 1;
                }
            }
            total_revenue += record.revenue.unwrap_or(0.0);
            total_fte += record.fte_total.unwrap_or(0.0);
            if record.fte_reliable == Some(true) {
                reliable_fte += 1;
            }
        }

        let per_care_type = CareType::ALL
            .iter()
            .zip(counts)
            .map(|(care_type, count)| CareTypeCount {
                care_type: *care_type,
                label: care_type.label(),
                count,
            })
            .collect();

        Self {
            total,
            per_care_type,
            total_revenue,
            total_fte,
            reliable_fte,
        }
    }

    pub fn count_for(&self, care_type: CareType) -> usize {
        self.per_care_type
            .iter()
            .find(|c| c.care_type == care_type)
            .map_or(0, |c| c.count)
    }
}

/// Distinct known provinces, sorted, for filter option lists
pub fn distinct_provinces(records: &[OrganizationRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.province.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_ignores_unknowns() {
        let records = vec![
            OrganizationRecord {
                is_vvt: Some(true),
                is_ggz: Some(true),
                revenue: Some(12_000_000.0),
                fte_total: Some(200.0),
                fte_reliable: Some(true),
                province: Some("Utrecht".to_string()),
                ..Default::default()
            },
            OrganizationRecord {
                is_vvt: Some(true),
                is_ghz: Some(false),
                province: Some("Drenthe".to_string()),
                ..Default::default()
            },
            OrganizationRecord {
                is_msi: Some(true),
                revenue: Some(1_000_000.0),
                fte_reliable: Some(false),
                province: Some("Utrecht".to_string()),
                ..Default::default()
            },
        ];

        let summary = DatasetSummary::of(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count_for(CareType::Vvt), 2);
        assert_eq!(summary.count_for(CareType::Ghz), 0);
        assert_eq!(summary.count_for(CareType::Msi), 1);
        assert_eq!(summary.total_revenue, 13_000_000.0);
        assert_eq!(summary.total_fte, 200.0);
        assert_eq!(summary.reliable_fte, 1);

        assert_eq!(distinct_provinces(&records), vec!["Drenthe", "Utrecht"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DatasetSummary::of(&Vec::<OrganizationRecord>::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.per_care_type.len(), CareType::ALL.len());
    }
}
