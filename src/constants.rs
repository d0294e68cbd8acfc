//! Sheet and lookup-table constants shared across the pipeline.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Primary sheet holding the identity columns of every organization
pub const PRIMARY_SHEET: &str = "RowData_01";

/// Auxiliary sheets in join priority order: the first sheet to contribute a
/// column owns it
pub const AUXILIARY_SHEETS: [&str; 4] = ["RowData_09", "RowData_10", "RowData_15", "RowData_16"];

/// Column shared by every sheet of a part
pub const JOIN_KEY: &str = "Code";

/// Sentinels recognized by the `yes_no` transform
pub const YES: &str = "ja";
pub const NO: &str = "nee";

/// Parts the upload form offers; more are accepted with a warning
pub const EXPECTED_MAX_PARTS: usize = 3;

pub const DEFAULT_MIN_REVENUE_PER_FTE: f64 = 20_000.0;
pub const DEFAULT_MAX_REVENUE_PER_FTE: f64 = 100_000.0;

/// Synthetic coordinate spread per hash step, in degrees
pub const SYNTHETIC_LAT_STEP: f64 = 0.005;
pub const SYNTHETIC_LON_STEP: f64 = 0.007;

/// Anchor used when the first postal digit has no regional anchor
pub const DEFAULT_ANCHOR: (f64, f64) = (52.1, 5.3);

/// Regional anchors keyed by the first digit of the postal code
pub const REGION_ANCHORS: [(char, (f64, f64)); 9] = [
    ('1', (52.37, 4.90)),
    ('2', (52.08, 4.31)),
    ('3', (52.09, 5.12)),
    ('4', (51.84, 5.85)),
    ('5', (51.44, 5.47)),
    ('6', (50.85, 5.70)),
    ('7', (52.22, 6.89)),
    ('8', (52.51, 6.09)),
    ('9', (53.22, 6.57)),
];

const PROVINCE_RANGES: &[(u8, u8, &str)] = &[
    (10, 15, "Noord-Holland"),
    (16, 16, "Flevoland"),
    (17, 19, "Noord-Holland"),
    (20, 27, "Zuid-Holland"),
    (28, 38, "Utrecht"),
    (39, 41, "Gelderland"),
    (42, 45, "Noord-Brabant"),
    (46, 47, "Zeeland"),
    (48, 53, "Noord-Brabant"),
    (54, 63, "Limburg"),
    (64, 70, "Gelderland"),
    (71, 78, "Overijssel"),
    (79, 79, "Drenthe"),
    (80, 80, "Overijssel"),
    (81, 82, "Flevoland"),
    (83, 89, "Friesland"),
    (90, 90, "Groningen"),
    (91, 94, "Drenthe"),
    (95, 99, "Groningen"),
];

/// Built-in province table for every two-digit postal prefix 10..=99
pub static PROVINCE_BY_PC2: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(90);
    for &(from, to, province) in PROVINCE_RANGES {
        for prefix in from..=to {
            table.insert(format!("{prefix:02}"), province);
        }
    }
    table
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc2_table_covers_every_prefix() {
        assert_eq!(PROVINCE_BY_PC2.len(), 90);
        for prefix in 10..=99u8 {
            assert!(PROVINCE_BY_PC2.contains_key(&format!("{prefix:02}")));
        }
        assert!(!PROVINCE_BY_PC2.contains_key("09"));
    }

    #[test]
    fn test_pc2_spot_checks() {
        assert_eq!(PROVINCE_BY_PC2["16"], "Flevoland");
        assert_eq!(PROVINCE_BY_PC2["79"], "Drenthe");
        assert_eq!(PROVINCE_BY_PC2["80"], "Overijssel");
        assert_eq!(PROVINCE_BY_PC2["97"], "Groningen");
    }
}
