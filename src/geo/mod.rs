//! Postal-code geography: reference tables and the tiered resolver.

pub mod lookup;
pub mod resolver;

pub use lookup::GeoLookupTable;
pub use resolver::{synthetic_coordinate, GeoResolver};

/// Normalizes a postal code to its digits: whitespace removed, upper-cased,
/// then everything but ASCII digits dropped ("1011 ab" → "1011")
pub fn postal_digits(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<String>()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_digits() {
        assert_eq!(postal_digits(" 1011 ab "), "1011");
        assert_eq!(postal_digits("NL-9712CP"), "9712");
        assert_eq!(postal_digits(""), "");
    }
}
