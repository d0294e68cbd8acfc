use sha2::{Digest, Sha256};

/// Hex SHA-256 of raw upload bytes
pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Key for a full ingestion run: the ordered part digests followed by the
/// reference-file digest. Part order matters, since it fixes `source_part`.
pub fn run_key(part_keys: &[String], geo_key: Option<&str>) -> String {
    let mut s = String::new();
    for key in part_keys {
        s.push_str(key);
        s.push('|');
    }
    s.push_str("geo:");
    if let Some(g) = geo_key {
        s.push_str(g);
    }

    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}
