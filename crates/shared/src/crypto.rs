//! Content hashing for uploaded media and shared-secret comparison.

use sha2::{Digest, Sha256};

/// SHA-256 of raw bytes as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Builds a content-addressed file name, e.g. `ab12...ef.webm`.
///
/// Identical uploads map to the same name, so resubmitting the same photo does
/// not grow the media directory.
pub fn content_addressed_name(bytes: &[u8], extension: Option<&str>) -> String {
    let digest = sha256_hex(bytes);
    match extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
        Some(ext) => format!("{}.{}", digest, ext.to_ascii_lowercase()),
        None => digest,
    }
}

/// Compares two secrets through their digests, so the comparison time does
/// not depend on how long a common prefix they share.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
