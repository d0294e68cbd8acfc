use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::postal_digits;
use crate::error::{ProspectError, Result};
use crate::types::parse_decimal;

const POSTCODE_ALIASES: &[&str] = &["postcode", "postal_code", "pc4", "pc", "zip"];
const LAT_ALIASES: &[&str] = &["lat", "latitude", "breedtegraad"];
const LON_ALIASES: &[&str] = &["lon", "lng", "longitude", "lengtegraad"];
const PROVINCE_ALIASES: &[&str] = &["provincie", "province", "prov"];

/// Encodings tried in order. encoding_rs maps the "latin-1" label onto
/// windows-1252, so one fallback covers both single-byte encodings.
fn candidate_encodings() -> [&'static Encoding; 2] {
    [UTF_8, WINDOWS_1252]
}

/// PC4-keyed province and coordinate tables built from a reference file.
/// Immutable once built; the first occurrence of a PC4 wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLookupTable {
    province_by_pc4: HashMap<String, String>,
    coords_by_pc4: HashMap<String, (f64, f64)>,
}

impl GeoLookupTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode and parse a reference file, trying each candidate encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut last_error = None;

        for encoding in candidate_encodings() {
            let Some(text) = decode_strict(bytes, encoding) else {
                debug!("Reference file is not valid {}", encoding.name());
                continue;
            };
            match Self::from_text(&text) {
                Ok(table) => {
                    info!(
                        encoding = encoding.name(),
                        provinces = table.province_count(),
                        coordinates = table.coordinate_count(),
                        "Loaded geo reference table"
                    );
                    return Ok(table);
                }
                Err(e) => {
                    debug!("Reference file failed to parse as {}: {}", encoding.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProspectError::Encoding {
            tried: candidate_encodings()
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join(", "),
        }))
    }

    /// Like [`GeoLookupTable::from_bytes`], but a failure degrades to empty
    /// tables so resolution falls through to the static and synthetic tiers
    pub fn from_bytes_or_empty(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes).unwrap_or_else(|e| {
            warn!("Geo reference file unusable, continuing without it: {}", e);
            Self::empty()
        })
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let delimiter = detect_delimiter(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let find = |aliases: &[&str]| {
            headers.iter().position(|h| {
                let normalized = h.trim_start_matches('\u{feff}').trim().to_lowercase();
                aliases.contains(&normalized.as_str())
            })
        };

        let pc_col = find(POSTCODE_ALIASES)
            .ok_or_else(|| ProspectError::MissingColumn("postcode".to_string()))?;
        let lat_col = find(LAT_ALIASES);
        let lon_col = find(LON_ALIASES);
        let prov_col = find(PROVINCE_ALIASES);

        let mut table = Self::empty();
        for record in reader.records() {
            let record = record?;
            let digits = postal_digits(record.get(pc_col).unwrap_or_default());
            if digits.len() < 4 {
                continue;
            }
            let pc4 = &digits[..4];

            if let Some(province) = prov_col.and_then(|i| record.get(i)) {
                let province = province.trim();
                if !province.is_empty() && !province.eq_ignore_ascii_case("nan") {
                    table.insert_province(pc4, province);
                }
            }

            if let (Some(lat_i), Some(lon_i)) = (lat_col, lon_col) {
                let lat = record.get(lat_i).and_then(parse_decimal);
                let lon = record.get(lon_i).and_then(parse_decimal);
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    table.insert_coords(pc4, (lat, lon));
                }
            }
        }

        Ok(table)
    }

    /// Adds a province unless the PC4 already has one
    pub fn insert_province(&mut self, pc4: &str, province: &str) {
        self.province_by_pc4
            .entry(pc4.to_string())
            .or_insert_with(|| province.to_string());
    }

    /// Adds a coordinate unless the PC4 already has one
    pub fn insert_coords(&mut self, pc4: &str, coords: (f64, f64)) {
        self.coords_by_pc4.entry(pc4.to_string()).or_insert(coords);
    }

    pub fn province(&self, pc4: &str) -> Option<&str> {
        self.province_by_pc4.get(pc4).map(String::as_str)
    }

    pub fn coords(&self, pc4: &str) -> Option<(f64, f64)> {
        self.coords_by_pc4.get(pc4).copied()
    }

    pub fn province_count(&self) -> usize {
        self.province_by_pc4.len()
    }

    pub fn coordinate_count(&self) -> usize {
        self.coords_by_pc4.len()
    }

    pub fn is_empty(&self) -> bool {
        self.province_by_pc4.is_empty() && self.coords_by_pc4.is_empty()
    }
}

fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let body = if encoding == UTF_8 {
        bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
    } else {
        bytes
    };
    encoding.decode_without_bom_handling_and_without_replacement(body)
}

/// Picks the most frequent of `;`, `,` and tab on the header line.
/// `max_by_key` keeps the last maximum, so `;` is listed last to win ties.
fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    [b'\t', b',', b';']
        .into_iter()
        .map(|d| (d, header.bytes().filter(|b| *b == d).count()))
        .filter(|(_, count)| *count > 0)
        .max_by_key(|(_, count)| *count)
        .map(|(d, _)| d)
        .unwrap_or(b';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_file_with_first_occurrence_wins() {
        let text = "Postcode;Lat;Lon;Provincie\n\
                    1011 AB;52.37;4.90;Noord-Holland\n\
                    1011 CD;52.99;4.10;Utrecht\n\
                    9712;53.21;6.56;Groningen\n";
        let table = GeoLookupTable::from_text(text).unwrap();

        assert_eq!(table.province("1011"), Some("Noord-Holland"));
        assert_eq!(table.coords("1011"), Some((52.37, 4.90)));
        assert_eq!(table.province("9712"), Some("Groningen"));
        assert_eq!(table.province_count(), 2);
    }

    #[test]
    fn test_unparseable_coordinates_still_contribute_province() {
        let text = "postcode;lat;lon;provincie\n3511;abc;5.12;Utrecht\n";
        let table = GeoLookupTable::from_text(text).unwrap();

        assert_eq!(table.province("3511"), Some("Utrecht"));
        assert_eq!(table.coords("3511"), None);
    }

    #[test]
    fn test_aliases_and_comma_delimiter() {
        let text = "ZIP,Latitude,Longitude,Province\n5611,51.44,5.47,Noord-Brabant\n";
        let table = GeoLookupTable::from_text(text).unwrap();

        assert_eq!(table.coords("5611"), Some((51.44, 5.47)));
        assert_eq!(table.province("5611"), Some("Noord-Brabant"));
    }

    #[test]
    fn test_missing_postcode_column_is_an_error() {
        let result = GeoLookupTable::from_text("plaats;lat;lon\nUtrecht;52.1;5.1\n");
        assert!(matches!(result, Err(ProspectError::MissingColumn(_))));
        assert!(GeoLookupTable::from_bytes_or_empty(b"plaats;lat\nx;1\n").is_empty());
    }

    #[test]
    fn test_latin1_bytes_fall_back_to_windows_1252() {
        // "Fryslân" with a single-byte 'â' is invalid UTF-8
        let mut bytes = b"postcode;provincie\n8911;Frysl".to_vec();
        bytes.push(0xE2);
        bytes.extend_from_slice(b"n\n");

        let table = GeoLookupTable::from_bytes(&bytes).unwrap();
        assert_eq!(table.province("8911"), Some("Fryslân"));
    }

    #[test]
    fn test_utf8_bom_is_ignored() {
        let bytes = "\u{feff}postcode;provincie\n7511;Overijssel\n".as_bytes().to_vec();
        let table = GeoLookupTable::from_bytes(&bytes).unwrap();
        assert_eq!(table.province("7511"), Some("Overijssel"));
    }

    #[test]
    fn test_short_postcodes_are_skipped() {
        let table = GeoLookupTable::from_text("postcode;provincie\n12;Utrecht\n").unwrap();
        assert!(table.is_empty());
    }
}
