use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_REVENUE_PER_FTE, DEFAULT_MIN_REVENUE_PER_FTE};
use crate::domain::{FundingScheme, OrganizationRecord, Region, RevenueCategory, SizeCategory};
use crate::geo::GeoResolver;

/// Plausible revenue-per-FTE band, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityBand {
    #[serde(rename = "min_revenue_per_fte")]
    pub min: f64,
    #[serde(rename = "max_revenue_per_fte")]
    pub max: f64,
}

impl Default for ReliabilityBand {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_REVENUE_PER_FTE,
            max: DEFAULT_MAX_REVENUE_PER_FTE,
        }
    }
}

impl ReliabilityBand {
    pub fn contains(&self, revenue_per_fte: f64) -> bool {
        (self.min..=self.max).contains(&revenue_per_fte)
    }
}

/// Trait for adding derived fields to merged records
pub trait Enricher {
    /// Return a copy of `record` with every derived field recomputed
    fn enrich(&self, record: &OrganizationRecord, resolver: &GeoResolver<'_>)
        -> OrganizationRecord;
}

/// Computes the financial, workforce and geographic indicators
#[derive(Debug, Clone, Default)]
pub struct MetricsEnricher {
    pub band: ReliabilityBand,
}

impl MetricsEnricher {
    pub fn new(band: ReliabilityBand) -> Self {
        Self { band }
    }

    /// Unknown when revenue or FTE is unknown or FTE is zero
    pub fn fte_reliable(&self, record: &OrganizationRecord) -> Option<bool> {
        let (revenue, fte) = record.revenue.zip(record.fte_total)?;
        if fte == 0.0 {
            return None;
        }
        Some(self.band.contains(revenue / fte))
    }
}

impl Enricher for MetricsEnricher {
    fn enrich(
        &self,
        record: &OrganizationRecord,
        resolver: &GeoResolver<'_>,
    ) -> OrganizationRecord {
        let mut enriched = record.clone();

        enriched.fte_reliable = self.fte_reliable(record);
        enriched.revenue_per_fte = revenue_per_fte(record);
        enriched.revenue_growth_pct = revenue_growth_pct(record);
        enriched.dominant_scheme = dominant_scheme(record);
        enriched.size_category = record.fte_total.map(SizeCategory::from_fte);
        enriched.revenue_category = record.revenue.map(RevenueCategory::from_revenue);
        enriched.region = record.province.as_deref().and_then(Region::from_province);
        enriched.possible_domestic_aid = possible_domestic_aid(record);

        let resolved = record
            .postal_code
            .as_deref()
            .and_then(|pc| resolver.resolve_coords_with_source(pc));
        enriched.lat = resolved.map(|((lat, _), _)| lat);
        enriched.lon = resolved.map(|((_, lon), _)| lon);
        enriched.coordinate_source = resolved.map(|(_, source)| source);

        enriched
    }
}

fn revenue_per_fte(record: &OrganizationRecord) -> Option<f64> {
    let (revenue, fte) = record.revenue.zip(record.fte_total)?;
    (fte > 0.0).then(|| revenue / fte)
}

fn revenue_growth_pct(record: &OrganizationRecord) -> Option<f64> {
    let (current, prior) = record.revenue.zip(record.revenue_prior_year)?;
    (prior > 0.0).then(|| (current - prior) / prior * 100.0)
}

/// Largest positive scheme revenue; earlier schemes win ties
fn dominant_scheme(record: &OrganizationRecord) -> Option<FundingScheme> {
    let mut best: Option<(FundingScheme, f64)> = None;
    for scheme in FundingScheme::PRIORITY {
        let Some(amount) = record.scheme_revenue(scheme) else {
            continue;
        };
        if amount <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, top)| amount > top) {
            best = Some((scheme, amount));
        }
    }
    best.map(|(scheme, _)| scheme)
}

fn possible_domestic_aid(record: &OrganizationRecord) -> bool {
    let wmo_positive = record.revenue_wmo.is_some_and(|wmo| wmo > 0.0);
    wmo_positive
        && record.vvt_district_nursing != Some(true)
        && record.vvt_nursing_home != Some(true)
}
