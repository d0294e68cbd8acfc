use md5::{Digest, Md5};

use super::{postal_digits, GeoLookupTable};
use crate::constants::{
    DEFAULT_ANCHOR, PROVINCE_BY_PC2, REGION_ANCHORS, SYNTHETIC_LAT_STEP, SYNTHETIC_LON_STEP,
};
use crate::domain::CoordinateSource;

/// Resolves postal codes against a reference table, falling back to the
/// built-in PC2 provinces and deterministic synthetic coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GeoResolver<'a> {
    table: &'a GeoLookupTable,
}

impl<'a> GeoResolver<'a> {
    pub fn new(table: &'a GeoLookupTable) -> Self {
        Self { table }
    }

    pub fn resolve_province(&self, postal_code: &str) -> Option<String> {
        let digits = postal_digits(postal_code);

        if digits.len() >= 4 {
            if let Some(province) = self.table.province(&digits[..4]) {
                return Some(province.to_string());
            }
        }
        if digits.len() >= 2 {
            return PROVINCE_BY_PC2.get(&digits[..2]).map(|p| p.to_string());
        }
        None
    }

    pub fn resolve_coords(&self, postal_code: &str) -> Option<(f64, f64)> {
        self.resolve_coords_with_source(postal_code)
            .map(|(coords, _)| coords)
    }

    /// Coordinates together with the tier that produced them
    pub fn resolve_coords_with_source(
        &self,
        postal_code: &str,
    ) -> Option<((f64, f64), CoordinateSource)> {
        let digits = postal_digits(postal_code);

        if digits.len() >= 4 {
            if let Some(coords) = self.table.coords(&digits[..4]) {
                return Some((coords, CoordinateSource::Exact));
            }
        }
        if digits.len() >= 2 {
            let key = if digits.len() >= 4 { &digits[..4] } else { &digits[..2] };
            return Some((synthetic_coordinate(key), CoordinateSource::Synthetic));
        }
        None
    }
}

/// Regional anchor for the first digit of a postal prefix
pub fn anchor_for(prefix: &str) -> (f64, f64) {
    prefix
        .chars()
        .next()
        .and_then(|first| {
            REGION_ANCHORS
                .iter()
                .find(|(digit, _)| *digit == first)
                .map(|(_, anchor)| *anchor)
        })
        .unwrap_or(DEFAULT_ANCHOR)
}

/// Hash-spread point around the regional anchor of `key` (a PC4 or PC2).
///
/// The 16-bit value is the first four hex characters of the MD5 digest,
/// i.e. the first two digest bytes read big-endian.
pub fn synthetic_coordinate(key: &str) -> (f64, f64) {
    let digest = Md5::digest(key.as_bytes());
    let hash = u16::from_be_bytes([digest[0], digest[1]]);

    let (base_lat, base_lon) = anchor_for(key);
    let lat_offset = (f64::from(hash % 100) - 50.0) * SYNTHETIC_LAT_STEP;
    let lon_offset = (f64::from((hash >> 8) % 100) - 50.0) * SYNTHETIC_LON_STEP;

    (base_lat + lat_offset, base_lon + lon_offset)
}
