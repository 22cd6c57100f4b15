//! # Utility Functions
//!
//! Hashing, text validation and timestamp helpers shared by the registry and the CLI.

use crate::{error::Result, PredictionError};
use sha2::{Digest, Sha256};

/// Hash a message using SHA256
pub fn sha256_hash(message: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    let hash = hasher.finalize();
    hex::encode(hash)
}

/// Digest stored in place of an event's access code.
pub fn access_code_digest(access_code: &str) -> String {
    sha256_hash(access_code)
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Lengths are not secret here: both sides are fixed-size hex digests.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check a candidate access code against a stored digest.
pub fn verify_access_code(candidate: &str, stored_digest: &str) -> bool {
    let candidate_digest = access_code_digest(candidate);
    constant_time_eq(candidate_digest.as_bytes(), stored_digest.as_bytes())
}

/// Validate a bounded ASCII text field
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(PredictionError::Validation(format!(
            "{field} cannot be empty"
        )));
    }

    if !value.is_ascii() {
        return Err(PredictionError::Validation(format!(
            "{field} must be ASCII text"
        )));
    }

    if value.len() > max_len {
        return Err(PredictionError::Validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }

    Ok(())
}

/// Format timestamp as human-readable string
pub fn format_timestamp(timestamp: u64) -> String {
    use chrono::DateTime;
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse timestamp from string
pub fn parse_timestamp(timestamp_str: &str) -> Result<u64> {
    timestamp_str
        .parse::<u64>()
        .map_err(|_| PredictionError::Validation(format!("Invalid timestamp: {timestamp_str}")))
}
