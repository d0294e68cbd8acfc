//! Declarative column mapping from DigiMV sheets to canonical record fields.

use serde::{Deserialize, Serialize};

use crate::constants::{AUXILIARY_SHEETS, NO, PRIMARY_SHEET, YES};
use crate::domain::OrganizationRecord;
use crate::types::{CellValue, RawRow};

/// Canonical fields that can be sourced from a sheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Code,
    Name,
    Kvk,
    Street,
    HouseNumber,
    PostalCode,
    Town,
    IsVvt,
    IsGgz,
    IsGhz,
    IsMsi,
    IsWmoSupport,
    IsWmoDomestic,
    VvtDistrictNursing,
    VvtNursingHome,
    VvtCrisisCare,
    VvtGeriatricRehab,
    Revenue,
    RevenuePriorYear,
    RevenueZvw,
    RevenueWlz,
    RevenueWmo,
    FteTotal,
    FteCareStaff,
    FteEmployed,
    FteHired,
    FteSelfEmployed,
    AbsencePct,
    Vacancies,
    VacanciesHardToFill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Number,
}

/// Value transforms a mapping may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// "ja" → true, "nee" → false, anything else unknown
    YesNo,
}

impl Transform {
    pub fn apply(&self, cell: &CellValue) -> Option<bool> {
        match self {
            Transform::YesNo => match cell {
                CellValue::Text(s) => {
                    let normalized = s.trim().to_lowercase();
                    if normalized == YES {
                        Some(true)
                    } else if normalized == NO {
                        Some(false)
                    } else {
                        None
                    }
                }
                _ => None,
            },
        }
    }
}

/// A single extracted value, typed by the kind of its target field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Flag(Option<bool>),
    Number(Option<f64>),
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field: Field,
    pub sheet: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl FieldMapping {
    pub fn new(field: Field, sheet: &str, column: &str) -> Self {
        Self {
            field,
            sheet: sheet.to_string(),
            column: column.to_string(),
            transform: None,
        }
    }

    pub fn yes_no(field: Field, sheet: &str, column: &str) -> Self {
        Self {
            transform: Some(Transform::YesNo),
            ..Self::new(field, sheet, column)
        }
    }

    /// Pull this mapping's value out of a joined row. Missing columns are unknown.
    pub fn extract(&self, row: &RawRow) -> FieldValue {
        let cell = row.get(&self.column).unwrap_or(&CellValue::Empty);
        match (self.transform, self.field.kind()) {
            (Some(transform), _) => FieldValue::Flag(transform.apply(cell)),
            (None, FieldKind::Text) => FieldValue::Text(cell.as_text()),
            (None, FieldKind::Number) => FieldValue::Number(cell.as_number()),
            (None, FieldKind::Flag) => FieldValue::Flag(match cell {
                CellValue::Bool(b) => Some(*b),
                _ => None,
            }),
        }
    }

    /// Checks the mapping against the known sheet layout
    pub fn validate(&self) -> Result<(), String> {
        let known_sheet =
            self.sheet == PRIMARY_SHEET || AUXILIARY_SHEETS.contains(&self.sheet.as_str());
        if !known_sheet {
            return Err(format!(
                "mapping for {:?} refers to unknown sheet '{}'",
                self.field, self.sheet
            ));
        }
        if self.column.trim().is_empty() {
            return Err(format!("mapping for {:?} has an empty column", self.field));
        }
        if self.transform.is_some() && self.field.kind() != FieldKind::Flag {
            return Err(format!(
                "transform on {:?} is only valid for flag fields",
                self.field
            ));
        }
        Ok(())
    }
}

impl Field {
    pub const ALL: [Field; 30] = [
        Field::Code,
        Field::Name,
        Field::Kvk,
        Field::Street,
        Field::HouseNumber,
        Field::PostalCode,
        Field::Town,
        Field::IsVvt,
        Field::IsGgz,
        Field::IsGhz,
        Field::IsMsi,
        Field::IsWmoSupport,
        Field::IsWmoDomestic,
        Field::VvtDistrictNursing,
        Field::VvtNursingHome,
        Field::VvtCrisisCare,
        Field::VvtGeriatricRehab,
        Field::Revenue,
        Field::RevenuePriorYear,
        Field::RevenueZvw,
        Field::RevenueWlz,
        Field::RevenueWmo,
        Field::FteTotal,
        Field::FteCareStaff,
        Field::FteEmployed,
        Field::FteHired,
        Field::FteSelfEmployed,
        Field::AbsencePct,
        Field::Vacancies,
        Field::VacanciesHardToFill,
    ];

    /// Name of the record column (and export header) this field fills
    pub fn record_column(&self) -> &'static str {
        use Field::*;
        match self {
            Code => "code",
            Name => "name",
            Kvk => "kvk",
            Street => "street",
            HouseNumber => "house_number",
            PostalCode => "postal_code",
            Town => "town",
            IsVvt => "is_vvt",
            IsGgz => "is_ggz",
            IsGhz => "is_ghz",
            IsMsi => "is_msi",
            IsWmoSupport => "is_wmo_support",
            IsWmoDomestic => "is_wmo_domestic",
            VvtDistrictNursing => "vvt_district_nursing",
            VvtNursingHome => "vvt_nursing_home",
            VvtCrisisCare => "vvt_crisis_care",
            VvtGeriatricRehab => "vvt_geriatric_rehab",
            Revenue => "revenue",
            RevenuePriorYear => "revenue_prior_year",
            RevenueZvw => "revenue_zvw",
            RevenueWlz => "revenue_wlz",
            RevenueWmo => "revenue_wmo",
            FteTotal => "fte_total",
            FteCareStaff => "fte_care_staff",
            FteEmployed => "fte_employed",
            FteHired => "fte_hired",
            FteSelfEmployed => "fte_self_employed",
            AbsencePct => "absence_pct",
            Vacancies => "vacancies",
            VacanciesHardToFill => "vacancies_hard_to_fill",
        }
    }

    pub fn kind(&self) -> FieldKind {
        use Field::*;
        match self {
            Code | Name | Kvk | Street | HouseNumber | PostalCode | Town => FieldKind::Text,
            IsVvt | IsGgz | IsGhz | IsMsi | IsWmoSupport | IsWmoDomestic | VvtDistrictNursing
            | VvtNursingHome | VvtCrisisCare | VvtGeriatricRehab => FieldKind::Flag,
            Revenue | RevenuePriorYear | RevenueZvw | RevenueWlz | RevenueWmo | FteTotal
            | FteCareStaff | FteEmployed | FteHired | FteSelfEmployed | AbsencePct | Vacancies
            | VacanciesHardToFill => FieldKind::Number,
        }
    }

    /// Write an extracted value into its slot on the record.
    /// A value of the wrong kind leaves the slot unknown.
    pub fn assign(&self, record: &mut OrganizationRecord, value: FieldValue) {
        use Field::*;
        match (self, value) {
            (Code, FieldValue::Text(v)) => record.code = v,
            (Name, FieldValue::Text(v)) => record.name = v,
            (Kvk, FieldValue::Text(v)) => record.kvk = v,
            (Street, FieldValue::Text(v)) => record.street = v,
            (HouseNumber, FieldValue::Text(v)) => record.house_number = v,
            (PostalCode, FieldValue::Text(v)) => record.postal_code = v,
            (Town, FieldValue::Text(v)) => record.town = v,
            (IsVvt, FieldValue::Flag(v)) => record.is_vvt = v,
            (IsGgz, FieldValue::Flag(v)) => record.is_ggz = v,
            (IsGhz, FieldValue::Flag(v)) => record.is_ghz = v,
            (IsMsi, FieldValue::Flag(v)) => record.is_msi = v,
            (IsWmoSupport, FieldValue::Flag(v)) => record.is_wmo_support = v,
            (IsWmoDomestic, FieldValue::Flag(v)) => record.is_wmo_domestic = v,
            (VvtDistrictNursing, FieldValue::Flag(v)) => record.vvt_district_nursing = v,
            (VvtNursingHome, FieldValue::Flag(v)) => record.vvt_nursing_home = v,
            (VvtCrisisCare, FieldValue::Flag(v)) => record.vvt_crisis_care = v,
            (VvtGeriatricRehab, FieldValue::Flag(v)) => record.vvt_geriatric_rehab = v,
            (Revenue, FieldValue::Number(v)) => record.revenue = v,
            (RevenuePriorYear, FieldValue::Number(v)) => record.revenue_prior_year = v,
            (RevenueZvw, FieldValue::Number(v)) => record.revenue_zvw = v,
            (RevenueWlz, FieldValue::Number(v)) => record.revenue_wlz = v,
            (RevenueWmo, FieldValue::Number(v)) => record.revenue_wmo = v,
            (FteTotal, FieldValue::Number(v)) => record.fte_total = v,
            (FteCareStaff, FieldValue::Number(v)) => record.fte_care_staff = v,
            (FteEmployed, FieldValue::Number(v)) => record.fte_employed = v,
            (FteHired, FieldValue::Number(v)) => record.fte_hired = v,
            (FteSelfEmployed, FieldValue::Number(v)) => record.fte_self_employed = v,
            (AbsencePct, FieldValue::Number(v)) => record.absence_pct = v,
            (Vacancies, FieldValue::Number(v)) => record.vacancies = v,
            (VacanciesHardToFill, FieldValue::Number(v)) => record.vacancies_hard_to_fill = v,
            _ => {}
        }
    }
}

/// The DigiMV column layout
pub fn default_mappings() -> Vec<FieldMapping> {
    use Field::*;
    vec![
        FieldMapping::new(Code, "RowData_01", "Code"),
        FieldMapping::new(Name, "RowData_01", "Name"),
        FieldMapping::new(Kvk, "RowData_01", "qNawKvk"),
        FieldMapping::new(Street, "RowData_01", "Street"),
        FieldMapping::new(HouseNumber, "RowData_01", "HouseNumber"),
        FieldMapping::new(PostalCode, "RowData_01", "PostalCode"),
        FieldMapping::new(Town, "RowData_01", "Town"),
        FieldMapping::yes_no(IsVvt, "RowData_09", "qTypeWTZaZorg_13"),
        FieldMapping::yes_no(IsGgz, "RowData_09", "qTypeWTZaZorg_8"),
        FieldMapping::yes_no(IsGhz, "RowData_09", "qTypeWTZaZorg_10"),
        FieldMapping::yes_no(IsMsi, "RowData_09", "qTypeWTZaZorg_6"),
        FieldMapping::yes_no(IsWmoSupport, "RowData_09", "qTypeWmoZorg_1"),
        FieldMapping::yes_no(IsWmoDomestic, "RowData_09", "qTypeWmoZorg_2"),
        FieldMapping::yes_no(VvtDistrictNursing, "RowData_09", "qTypeWTZaZorgVenV_3"),
        FieldMapping::yes_no(VvtNursingHome, "RowData_09", "qTypeWTZaZorgVenV_4"),
        FieldMapping::yes_no(VvtCrisisCare, "RowData_09", "qTypeWTZaZorgVenV_2"),
        FieldMapping::yes_no(VvtGeriatricRehab, "RowData_09", "qTypeWTZaZorgVenV_5"),
        FieldMapping::new(Revenue, "RowData_10", "qTotaalBaten_0"),
        FieldMapping::new(RevenuePriorYear, "RowData_10", "qTotaalBaten_1"),
        FieldMapping::new(RevenueZvw, "RowData_10", "qBatenZorgZvw_0"),
        FieldMapping::new(RevenueWlz, "RowData_10", "qBatenZorgWlz_0"),
        FieldMapping::new(RevenueWmo, "RowData_10", "qBatenZorgWmo_0"),
        FieldMapping::new(FteTotal, "RowData_15", "qPersTotTot_AantalFte"),
        FieldMapping::new(FteCareStaff, "RowData_15", "qPersTotZorg_AantalFte"),
        FieldMapping::new(FteEmployed, "RowData_15", "qPersTotLoondienst_AantalFte"),
        FieldMapping::new(FteHired, "RowData_15", "qPersTotInhuur_AantalFte"),
        FieldMapping::new(FteSelfEmployed, "RowData_15", "qPersTotZzp_AantalFte"),
        FieldMapping::new(AbsencePct, "RowData_16", "qPersVerzuimPct_0"),
        FieldMapping::new(Vacancies, "RowData_16", "qPersVacatures_0"),
        FieldMapping::new(VacanciesHardToFill, "RowData_16", "qPersVacaturesMoeilijk_0"),
    ]
}
