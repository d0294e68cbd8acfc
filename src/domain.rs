//! Canonical organization record and the categorical types derived for it.
//!
//! Every field is optional: `None` means "unknown" and is never overloaded with
//! zero or an empty string. The struct is flat so that it maps one-to-one onto
//! the columns of an exported sheet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level care types. A record is kept only if at least one is `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareType {
    Vvt,
    Ggz,
    Ghz,
    Msi,
    WmoSupport,
    WmoDomestic,
}

impl CareType {
    pub const ALL: [CareType; 6] = [
        CareType::Vvt,
        CareType::Ggz,
        CareType::Ghz,
        CareType::Msi,
        CareType::WmoSupport,
        CareType::WmoDomestic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CareType::Vvt => "VVT",
            CareType::Ggz => "GGZ",
            CareType::Ghz => "GHZ",
            CareType::Msi => "MSI",
            CareType::WmoSupport => "WMO begeleiding",
            CareType::WmoDomestic => "WMO huishoudelijke hulp",
        }
    }
}

/// VVT sub-specialties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VvtSpecialty {
    DistrictNursing,
    NursingHome,
    CrisisCare,
    GeriatricRehab,
}

/// Funding schemes in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundingScheme {
    Zvw,
    Wlz,
    Wmo,
}

impl FundingScheme {
    pub const PRIORITY: [FundingScheme; 3] =
        [FundingScheme::Zvw, FundingScheme::Wlz, FundingScheme::Wmo];
}

/// Workforce size bands on total FTE (lower bound inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    #[serde(rename = "<50")]
    Micro,
    #[serde(rename = "50-150")]
    Small,
    #[serde(rename = "150-500")]
    Medium,
    #[serde(rename = "500-1500")]
    Large,
    #[serde(rename = ">=1500")]
    VeryLarge,
}

impl SizeCategory {
    pub fn from_fte(fte: f64) -> Self {
        match fte {
            f if f < 50.0 => SizeCategory::Micro,
            f if f < 150.0 => SizeCategory::Small,
            f if f < 500.0 => SizeCategory::Medium,
            f if f < 1500.0 => SizeCategory::Large,
            _ => SizeCategory::VeryLarge,
        }
    }
}

/// Revenue bands in millions (lower bound inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RevenueCategory {
    #[serde(rename = "<1M")]
    UnderOne,
    #[serde(rename = "1-5M")]
    OneToFive,
    #[serde(rename = "5-10M")]
    FiveToTen,
    #[serde(rename = "10-50M")]
    TenToFifty,
    #[serde(rename = "50-100M")]
    FiftyToHundred,
    #[serde(rename = ">=100M")]
    HundredPlus,
}

impl RevenueCategory {
    pub fn from_revenue(revenue: f64) -> Self {
        let millions = revenue / 1_000_000.0;
        match millions {
            m if m < 1.0 => RevenueCategory::UnderOne,
            m if m < 5.0 => RevenueCategory::OneToFive,
            m if m < 10.0 => RevenueCategory::FiveToTen,
            m if m < 50.0 => RevenueCategory::TenToFifty,
            m if m < 100.0 => RevenueCategory::FiftyToHundred,
            _ => RevenueCategory::HundredPlus,
        }
    }
}

/// Macro-regions grouping the twelve provinces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Noord,
    Oost,
    West,
    Zuid,
}

impl Region {
    pub fn from_province(province: &str) -> Option<Self> {
        match province.trim().to_lowercase().as_str() {
            "groningen" | "friesland" | "fryslân" | "fryslan" | "drenthe" => Some(Region::Noord),
            "overijssel" | "gelderland" | "flevoland" => Some(Region::Oost),
            "noord-holland" | "zuid-holland" | "utrecht" | "zeeland" => Some(Region::West),
            "noord-brabant" | "limburg" => Some(Region::Zuid),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Noord => "Noord",
            Region::Oost => "Oost",
            Region::West => "West",
            Region::Zuid => "Zuid",
        };
        write!(f, "{name}")
    }
}

/// Which resolution tier produced a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSource {
    /// Looked up from the reference file by 4-digit prefix
    Exact,
    /// Hash-derived point around a regional anchor
    Synthetic,
}

/// One healthcare provider as it moves through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationRecord {
    /// 1-based index of the part this record came from
    pub source_part: usize,

    // Identity
    pub code: Option<String>,
    pub name: Option<String>,
    pub kvk: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub town: Option<String>,

    // Classification
    pub is_vvt: Option<bool>,
    pub is_ggz: Option<bool>,
    pub is_ghz: Option<bool>,
    pub is_msi: Option<bool>,
    pub is_wmo_support: Option<bool>,
    pub is_wmo_domestic: Option<bool>,
    pub vvt_district_nursing: Option<bool>,
    pub vvt_nursing_home: Option<bool>,
    pub vvt_crisis_care: Option<bool>,
    pub vvt_geriatric_rehab: Option<bool>,

    // Financial
    pub revenue: Option<f64>,
    pub revenue_prior_year: Option<f64>,
    pub revenue_zvw: Option<f64>,
    pub revenue_wlz: Option<f64>,
    pub revenue_wmo: Option<f64>,

    // Workforce
    pub fte_total: Option<f64>,
    pub fte_care_staff: Option<f64>,
    pub fte_employed: Option<f64>,
    pub fte_hired: Option<f64>,
    pub fte_self_employed: Option<f64>,
    pub absence_pct: Option<f64>,
    pub vacancies: Option<f64>,
    pub vacancies_hard_to_fill: Option<f64>,

    // Derived
    pub province: Option<String>,
    pub region: Option<Region>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub coordinate_source: Option<CoordinateSource>,
    pub fte_reliable: Option<bool>,
    pub revenue_per_fte: Option<f64>,
    pub revenue_growth_pct: Option<f64>,
    pub dominant_scheme: Option<FundingScheme>,
    pub size_category: Option<SizeCategory>,
    pub revenue_category: Option<RevenueCategory>,
    pub possible_domestic_aid: bool,
}

impl OrganizationRecord {
    pub fn care_type(&self, care_type: CareType) -> Option<bool> {
        match care_type {
            CareType::Vvt => self.is_vvt,
            CareType::Ggz => self.is_ggz,
            CareType::Ghz => self.is_ghz,
            CareType::Msi => self.is_msi,
            CareType::WmoSupport => self.is_wmo_support,
            CareType::WmoDomestic => self.is_wmo_domestic,
        }
    }

    pub fn specialty(&self, specialty: VvtSpecialty) -> Option<bool> {
        match specialty {
            VvtSpecialty::DistrictNursing => self.vvt_district_nursing,
            VvtSpecialty::NursingHome => self.vvt_nursing_home,
            VvtSpecialty::CrisisCare => self.vvt_crisis_care,
            VvtSpecialty::GeriatricRehab => self.vvt_geriatric_rehab,
        }
    }

    pub fn scheme_revenue(&self, scheme: FundingScheme) -> Option<f64> {
        match scheme {
            FundingScheme::Zvw => self.revenue_zvw,
            FundingScheme::Wlz => self.revenue_wlz,
            FundingScheme::Wmo => self.revenue_wmo,
        }
    }

    /// True when any top-level care-type flag is `true`
    pub fn has_recognized_care_type(&self) -> bool {
        CareType::ALL
            .iter()
            .any(|t| self.care_type(*t) == Some(true))
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}
