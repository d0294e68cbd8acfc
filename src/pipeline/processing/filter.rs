//! Composable record filtering.
//!
//! Every criterion that is set must hold (AND); a multi-valued criterion holds
//! when any of its values matches (OR). Criteria over a column the dataset was
//! built without are skipped, so a re-imported file that lacks a column is
//! never filtered down to nothing by it. A column that exists but holds only
//! empty cells is present, and its unknown values fail range criteria.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    CareType, FundingScheme, OrganizationRecord, Region, RevenueCategory, SizeCategory,
    VvtSpecialty,
};
use crate::pipeline::processing::columns::ColumnPresence;

/// Record fields the free-text search can match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Town,
    Kvk,
    Code,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Town,
        SearchField::Kvk,
        SearchField::Code,
    ];

    pub fn value<'a>(&self, record: &'a OrganizationRecord) -> Option<&'a str> {
        match self {
            SearchField::Name => record.name.as_deref(),
            SearchField::Town => record.town.as_deref(),
            SearchField::Kvk => record.kvk.as_deref(),
            SearchField::Code => record.code.as_deref(),
        }
    }
}

/// Structured filter criteria; every field is optional.
/// Revenue bounds are in currency units, not millions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub care_types: Vec<CareType>,
    pub specialties: Vec<VvtSpecialty>,
    pub provinces: Vec<String>,
    pub regions: Vec<Region>,
    pub revenue_min: Option<f64>,
    pub revenue_max: Option<f64>,
    pub revenue_categories: Vec<RevenueCategory>,
    pub dominant_schemes: Vec<FundingScheme>,
    pub growth_min: Option<f64>,
    pub growth_max: Option<f64>,
    pub growth_positive_only: bool,
    pub size_categories: Vec<SizeCategory>,
    pub fte_min: Option<f64>,
    pub fte_max: Option<f64>,
    pub has_fte_data: bool,
    pub reliable_fte_only: bool,
    pub absence_min: Option<f64>,
    pub absence_max: Option<f64>,
    pub vacancies_min: Option<f64>,
    pub possible_domestic_aid_only: bool,
}

impl FilterSpec {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

type Predicate<'s> = Box<dyn Fn(&OrganizationRecord) -> bool + 's>;

/// Evaluates a [`FilterSpec`] against a dataset without mutating it
#[derive(Debug, Clone)]
pub struct FilterEngine {
    search_fields: Vec<SearchField>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(SearchField::ALL.to_vec())
    }
}

impl FilterEngine {
    pub fn new(search_fields: Vec<SearchField>) -> Self {
        Self { search_fields }
    }

    /// Matching records in input order. `columns` are the fields the
    /// dataset was built with.
    pub fn apply<'a>(
        &self,
        records: &'a [OrganizationRecord],
        columns: &ColumnPresence,
        spec: &FilterSpec,
    ) -> Vec<&'a OrganizationRecord> {
        let predicates = self.predicates(spec, columns);
        debug!(criteria = predicates.len(), "Applying filter");

        records
            .iter()
            .filter(|r| predicates.iter().all(|p| p(*r)))
            .collect()
    }

    fn predicates<'s>(
        &'s self,
        spec: &'s FilterSpec,
        presence: &ColumnPresence,
    ) -> Vec<Predicate<'s>> {
        let mut predicates: Vec<Predicate<'s>> = Vec::new();

        if let Some(needle) = spec.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let fields: Vec<SearchField> = self
                .search_fields
                .iter()
                .copied()
                .filter(|f| presence.search(*f))
                .collect();
            if !fields.is_empty() {
                let needle = needle.to_lowercase();
                predicates.push(Box::new(move |r: &OrganizationRecord| {
                    fields.iter().any(|f| {
                        f.value(r)
                            .is_some_and(|v| v.to_lowercase().contains(&needle))
                    })
                }));
            }
        }

        let care_types: Vec<CareType> = spec
            .care_types
            .iter()
            .copied()
            .filter(|t| presence.care_type(*t))
            .collect();
        if !care_types.is_empty() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                care_types.iter().any(|t| r.care_type(*t) == Some(true))
            }));
        }

        let specialties: Vec<VvtSpecialty> = spec
            .specialties
            .iter()
            .copied()
            .filter(|s| presence.specialty(*s))
            .collect();
        if !specialties.is_empty() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                specialties.iter().any(|s| r.specialty(*s) == Some(true))
            }));
        }

        if !spec.provinces.is_empty() && presence.province() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.province
                    .as_deref()
                    .is_some_and(|p| spec.provinces.iter().any(|wanted| wanted == p))
            }));
        }

        if !spec.regions.is_empty() && presence.province() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.region.is_some_and(|region| spec.regions.contains(&region))
            }));
        }

        if presence.revenue() && (spec.revenue_min.is_some() || spec.revenue_max.is_some()) {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                in_range(r.revenue, spec.revenue_min, spec.revenue_max)
            }));
        }

        if !spec.revenue_categories.is_empty() && presence.revenue() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.revenue_category
                    .is_some_and(|c| spec.revenue_categories.contains(&c))
            }));
        }

        if !spec.dominant_schemes.is_empty() && presence.dominant_scheme() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.dominant_scheme
                    .is_some_and(|s| spec.dominant_schemes.contains(&s))
            }));
        }

        if presence.growth() {
            if spec.growth_min.is_some() || spec.growth_max.is_some() {
                predicates.push(Box::new(move |r: &OrganizationRecord| {
                    in_range(r.revenue_growth_pct, spec.growth_min, spec.growth_max)
                }));
            }
            if spec.growth_positive_only {
                predicates.push(Box::new(move |r: &OrganizationRecord| {
                    r.revenue_growth_pct.is_some_and(|g| g > 0.0)
                }));
            }
        }

        if !spec.size_categories.is_empty() && presence.fte() {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.size_category.is_some_and(|c| spec.size_categories.contains(&c))
            }));
        }

        if presence.fte() {
            if spec.fte_min.is_some() || spec.fte_max.is_some() {
                predicates.push(Box::new(move |r: &OrganizationRecord| {
                    in_range(r.fte_total, spec.fte_min, spec.fte_max)
                }));
            }
            if spec.has_fte_data {
                predicates.push(Box::new(move |r: &OrganizationRecord| {
                    r.fte_total.is_some_and(|f| f > 0.0)
                }));
            }
        }

        if spec.reliable_fte_only && presence.fte_reliable() {
            predicates.push(Box::new(move |r: &OrganizationRecord| r.fte_reliable == Some(true)));
        }

        if presence.absence() && (spec.absence_min.is_some() || spec.absence_max.is_some()) {
            // Unknown absence passes
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.absence_pct.is_none()
                    || in_range(r.absence_pct, spec.absence_min, spec.absence_max)
            }));
        }

        if let Some(minimum) = spec.vacancies_min.filter(|_| presence.vacancies()) {
            predicates.push(Box::new(move |r: &OrganizationRecord| {
                r.vacancies.is_some_and(|v| v >= minimum)
            }));
        }

        if spec.possible_domestic_aid_only {
            predicates.push(Box::new(move |r: &OrganizationRecord| r.possible_domestic_aid));
        }

        predicates
    }
}

/// Inclusive range check; unknown values never match
fn in_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}
