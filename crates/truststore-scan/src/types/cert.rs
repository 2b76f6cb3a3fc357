//! Normalized certificate and key entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// SHA-256 fingerprint of a certificate's DER encoding.
pub type CertFingerprint = String;

/// A certificate extracted from a loaded store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    /// Alias of the store entry this certificate came from
    pub alias: String,
    /// Subject distinguished name (RFC 4514)
    pub subject: String,
    /// Issuer distinguished name (RFC 4514)
    pub issuer: String,
    /// Serial number (colon-separated hex)
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Whether the cert was expired at extraction time
    pub expired: bool,
    /// SHA-256 fingerprint of DER bytes (hex)
    pub fingerprint: CertFingerprint,
    /// Raw DER encoding
    #[serde(skip_serializing, default)]
    pub der: Vec<u8>,
}

impl CertificateEntry {
    /// Returns true if the subject contains `needle`, ignoring case.
    #[must_use]
    pub fn subject_contains(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// A private key unwrapped from a key entry.
pub struct PrivateKeyEntry {
    /// Alias of the key entry
    pub alias: String,
    /// PKCS#8 `PrivateKeyInfo` bytes, wiped on drop
    pub pkcs8: Zeroizing<Vec<u8>>,
    /// Number of certificates in the entry's chain
    pub chain_len: usize,
}

impl std::fmt::Debug for PrivateKeyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyEntry")
            .field("alias", &self.alias)
            .field("pkcs8", &"<redacted>")
            .field("chain_len", &self.chain_len)
            .finish()
    }
}
