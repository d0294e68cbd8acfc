//! Which source columns a dataset was built from.
//!
//! Presence is structural: a column counts once its header was seen in the
//! input, even when every cell under it is empty. Derived fields are present
//! when the source fields they are computed from are.

use std::collections::HashSet;

use crate::domain::{CareType, VvtSpecialty};
use crate::pipeline::processing::filter::SearchField;
use crate::pipeline::processing::normalize::Field;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    fields: HashSet<Field>,
}

impl ColumnPresence {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Every source field present
    pub fn all() -> Self {
        Self::new(Field::ALL)
    }

    /// Presence from the header row of an exported master file
    pub fn from_record_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let headers: HashSet<&str> = headers.into_iter().map(str::trim).collect();
        Self::new(
            Field::ALL
                .into_iter()
                .filter(|f| headers.contains(f.record_column())),
        )
    }

    pub fn extend(&mut self, other: &ColumnPresence) {
        self.fields.extend(other.fields.iter().copied());
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn search(&self, field: SearchField) -> bool {
        self.contains(match field {
            SearchField::Name => Field::Name,
            SearchField::Town => Field::Town,
            SearchField::Kvk => Field::Kvk,
            SearchField::Code => Field::Code,
        })
    }

    pub fn care_type(&self, care_type: CareType) -> bool {
        self.contains(match care_type {
            CareType::Vvt => Field::IsVvt,
            CareType::Ggz => Field::IsGgz,
            CareType::Ghz => Field::IsGhz,
            CareType::Msi => Field::IsMsi,
            CareType::WmoSupport => Field::IsWmoSupport,
            CareType::WmoDomestic => Field::IsWmoDomestic,
        })
    }

    pub fn specialty(&self, specialty: VvtSpecialty) -> bool {
        self.contains(match specialty {
            VvtSpecialty::DistrictNursing => Field::VvtDistrictNursing,
            VvtSpecialty::NursingHome => Field::VvtNursingHome,
            VvtSpecialty::CrisisCare => Field::VvtCrisisCare,
            VvtSpecialty::GeriatricRehab => Field::VvtGeriatricRehab,
        })
    }

    /// Province and region follow from the postal code
    pub fn province(&self) -> bool {
        self.contains(Field::PostalCode)
    }

    pub fn revenue(&self) -> bool {
        self.contains(Field::Revenue)
    }

    pub fn growth(&self) -> bool {
        self.contains(Field::Revenue) && self.contains(Field::RevenuePriorYear)
    }

    pub fn dominant_scheme(&self) -> bool {
        [Field::RevenueZvw, Field::RevenueWlz, Field::RevenueWmo]
            .into_iter()
            .any(|f| self.contains(f))
    }

    pub fn fte(&self) -> bool {
        self.contains(Field::FteTotal)
    }

    pub fn fte_reliable(&self) -> bool {
        self.contains(Field::Revenue) && self.contains(Field::FteTotal)
    }

    pub fn absence(&self) -> bool {
        self.contains(Field::AbsencePct)
    }

    pub fn vacancies(&self) -> bool {
        self.contains(Field::Vacancies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_columns_map_to_source_fields() {
        let presence = ColumnPresence::from_record_columns([
            "code",
            " postal_code ",
            "revenue",
            "region",
            "Unrelated",
        ]);

        assert_eq!(
            presence,
            ColumnPresence::new([Field::Code, Field::PostalCode, Field::Revenue])
        );
        assert!(presence.search(SearchField::Code));
        assert!(!presence.search(SearchField::Name));
        assert!(presence.province());
        assert!(presence.revenue());
        assert!(!presence.growth());
        assert!(!presence.fte_reliable());
    }

    #[test]
    fn test_derived_fields_need_all_their_inputs() {
        let mut presence = ColumnPresence::new([Field::FteTotal]);
        assert!(presence.fte());
        assert!(!presence.fte_reliable());

        presence.extend(&ColumnPresence::new([Field::Revenue]));
        assert!(presence.fte_reliable());

        presence.extend(&ColumnPresence::new([Field::RevenueWmo]));
        assert!(presence.dominant_scheme());
        assert!(ColumnPresence::all().growth());
    }
}
