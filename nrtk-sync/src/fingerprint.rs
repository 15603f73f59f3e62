//! Content fingerprint over the raw feed bytes.
//!
//! The hash covers the bytes exactly as fetched, so any change, even
//! whitespace or key order, forces a republish.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Hex SHA-256 of a payload plus the moment it was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub checksum: String,
    pub computed_at: DateTime<Utc>,
}

/// Fingerprint `raw`.
pub fn fingerprint(raw: &[u8]) -> Fingerprint {
    let fp = Fingerprint {
        checksum: checksum(raw),
        computed_at: Utc::now(),
    };
    tracing::info!("content checksum: {}", fp.checksum);
    fp
}

/// Lowercase hex SHA-256 of `raw`.
pub fn checksum(raw: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(raw);
    hex::encode(h.finalize())
}
