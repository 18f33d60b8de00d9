//! SHA-256 fingerprints for uploads and passages

use sha2::{Digest, Sha256};

/// Lowercase hex digest of `content`
pub fn hash_content(content: &str) -> String {
    hash_bytes(content.as_bytes())
}

/// Lowercase hex digest of raw upload bytes
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
