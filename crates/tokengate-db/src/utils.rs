//! Shared utility functions

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Parse a datetime string (RFC3339 format) or return current time
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Hex-encoded SHA-256 digest of a token
///
/// Refresh tokens are stored by digest so the table never holds a usable
/// credential. Equal tokens always produce equal digests.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
