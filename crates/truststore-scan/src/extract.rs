//! Certificate and key extraction from loaded stores.
//!
//! Extraction is best-effort per alias: an alias whose content cannot be
//! coerced to the requested shape is skipped and logged, never fatal.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::hash::sha256_bytes;
use crate::types::{CertificateEntry, EntryKind, LoadedStore, PrivateKeyEntry, StoreEntry, StoredCertificate};

/// Parse one DER certificate into the entry shape.
///
/// Returns `None` if the bytes are not a parseable X.509 certificate.
#[must_use]
pub fn parse_certificate(alias: &str, der: &[u8]) -> Option<CertificateEntry> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| debug!(alias, error = %e, "skipping unparseable certificate"))
        .ok()?;

    let not_before = asn1_to_utc(cert.validity().not_before);
    let not_after = asn1_to_utc(cert.validity().not_after);

    Some(CertificateEntry {
        alias: alias.to_string(),
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        serial: cert.raw_serial_as_string(),
        not_before,
        not_after,
        expired: Utc::now() > not_after,
        fingerprint: sha256_bytes(der),
        der: der.to_vec(),
    })
}

/// Certificates of every trusted-certificate alias, in enumeration order.
#[must_use]
pub fn certificates(store: &LoadedStore) -> Vec<CertificateEntry> {
    store
        .entries()
        .filter(|(_, entry)| entry.kind() == EntryKind::Certificate)
        .filter_map(|(alias, entry)| coerce(alias, entry.certificate()?))
        .collect()
}

/// Every certificate of every alias's chain, flattened.
///
/// A certificate shared by several chains appears once per chain.
#[must_use]
pub fn chain_certificates(store: &LoadedStore) -> Vec<CertificateEntry> {
    store
        .entries()
        .flat_map(|(alias, entry)| entry.chain().iter().map(move |cert| (alias, cert)))
        .filter_map(|(alias, cert)| coerce(alias, cert))
        .collect()
}

/// Unwrap every key entry with `password`.
///
/// Keys the password does not open are left out.
#[must_use]
pub fn keys(store: &LoadedStore, password: &str) -> Vec<PrivateKeyEntry> {
    store
        .entries()
        .filter_map(|(alias, entry)| match entry {
            StoreEntry::PrivateKey { key, chain } => match key.unwrap(password) {
                Ok(pkcs8) => Some(PrivateKeyEntry {
                    alias: alias.to_string(),
                    pkcs8,
                    chain_len: chain.len(),
                }),
                Err(e) => {
                    debug!(alias, error = %e, "skipping key entry");
                    None
                }
            },
            StoreEntry::TrustedCertificate(_) => None,
        })
        .collect()
}

/// Keep the entries whose subject contains `substring`, ignoring case.
///
/// `None` passes everything through. Order is preserved.
#[must_use]
pub fn filter_by_subject(
    entries: Vec<CertificateEntry>,
    substring: Option<&str>,
) -> Vec<CertificateEntry> {
    match substring {
        None => entries,
        Some(needle) => entries
            .into_iter()
            .filter(|entry| entry.subject_contains(needle))
            .collect(),
    }
}

/// Trust anchors of a store: every trusted certificate plus the last
/// certificate of each key chain, first occurrence per fingerprint.
#[must_use]
pub fn trust_anchors(store: &LoadedStore) -> Vec<CertificateEntry> {
    let mut seen = HashSet::new();
    store
        .entries()
        .filter_map(|(alias, entry)| match entry {
            StoreEntry::TrustedCertificate(cert) => coerce(alias, cert),
            StoreEntry::PrivateKey { chain, .. } => coerce(alias, chain.last()?),
        })
        .filter(|entry| seen.insert(entry.fingerprint.clone()))
        .collect()
}

fn coerce(alias: &str, cert: &StoredCertificate) -> Option<CertificateEntry> {
    if !cert.is_x509() {
        debug!(alias, cert_type = %cert.cert_type, "skipping non-X.509 certificate");
        return None;
    }
    parse_certificate(alias, &cert.der)
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
