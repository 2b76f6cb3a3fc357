//! Certificate fingerprints via `ring::digest`.

use ring::digest::{digest, SHA256};

/// SHA-256 of raw bytes (certificate DER), lowercase hex.
#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(
            sha256_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            sha256_bytes(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
