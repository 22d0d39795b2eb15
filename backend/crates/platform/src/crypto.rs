//! Hashing Utilities
//!
//! Tokens and API keys are never written to logs. Log lines carry a short
//! fingerprint instead so two log entries can still be correlated.

use base64::{Engine, engine::general_purpose};
use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a fingerprint
const FINGERPRINT_BYTES: usize = 6;

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as URL-safe base64 without padding
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Short, non-reversible fingerprint of a secret for log correlation
pub fn fingerprint(secret: &str) -> String {
    let digest = sha256(secret.as_bytes());
    to_base64_url(&digest[..FINGERPRINT_BYTES])
}
