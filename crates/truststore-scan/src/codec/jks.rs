//! Java keystore (JKS) container codec, backed by the `jks` crate.
//!
//! The container is read entry by entry so the integrity trailer can be
//! skipped when no password is supplied, as the JDK does. Private keys stay
//! sealed in their key-protector form until a caller asks for them.

use jks::common::{MAGIC, VERSION_01, VERSION_02, WHITENER_MESSAGE};
use jks::decoder::Decoder;
use jks::encoder::Encoder;
use jks::{keyprotector, Entry, KeyStoreError, PrivateKeyEntry, TrustedCertificateEntry};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;
use x509_parser::der_parser::parse_der;
use zeroize::Zeroizing;

use crate::error::{LoadError, Result, ScanError};
use crate::types::{
    LoadedStore, ProtectedKey, StoreEntry, StoreFormat, StoredCertificate, UnsealError,
};

/// Returns true if `data` starts with the JKS magic number.
#[must_use]
pub fn looks_like_jks(data: &[u8]) -> bool {
    data.get(..4) == Some(&MAGIC.to_be_bytes()[..])
}

/// Decode a JKS container.
///
/// With `password == None` the integrity trailer is not checked, matching
/// the JDK. Aliases are lower-cased, as the JDK does for this format.
pub fn decode(
    path: &Path,
    data: &[u8],
    password: Option<&str>,
) -> std::result::Result<LoadedStore, LoadError> {
    let corrupt = |e: KeyStoreError| LoadError::corrupt(path, e.to_string());

    if !looks_like_jks(data) {
        return Err(corrupt(KeyStoreError::InvalidMagic));
    }

    let mut reader = data;
    let mut decoder = Decoder::new(&mut reader);
    if let Some(password) = password {
        decoder.update_digest(&java_password(password.as_bytes()));
        decoder.update_digest(WHITENER_MESSAGE);
    }

    decoder.read_u32().map_err(corrupt)?;
    let version = decoder.read_u32().map_err(corrupt)?;
    if version != VERSION_01 && version != VERSION_02 {
        return Err(corrupt(KeyStoreError::UnknownVersion(version)));
    }
    let count = decoder.read_u32().map_err(corrupt)?;

    let mut store = LoadedStore::new(StoreFormat::Jks);
    for _ in 0..count {
        let (alias, entry) = decoder.read_entry(version).map_err(corrupt)?;
        let entry = match entry {
            Entry::TrustedCertificate(tce) => StoreEntry::TrustedCertificate(from_jks_cert(tce.certificate)),
            Entry::PrivateKey(pke) => StoreEntry::PrivateKey {
                key: ProtectedKey::Sealed(pke.private_key),
                chain: pke.certificate_chain.into_iter().map(from_jks_cert).collect(),
            },
        };
        store.insert(alias.to_lowercase(), entry);
    }

    if password.is_some() {
        decoder.verify_digest().map_err(|e| match e {
            KeyStoreError::InvalidDigest => LoadError::BadPassword {
                path: path.to_path_buf(),
            },
            other => corrupt(other),
        })?;
    } else {
        debug!(path = %path.display(), "JKS integrity check skipped (no password)");
    }

    Ok(store)
}

/// Encode `store` as a version-2 JKS container keyed with `password`.
///
/// Entries are written in alias order. Already-decrypted keys are sealed
/// again under their own password.
pub fn encode(store: &LoadedStore, password: &str) -> Result<Vec<u8>> {
    let encode_err = |reason: String| ScanError::Encode {
        format: "JKS",
        reason,
    };
    let count = u32::try_from(store.len()).map_err(|e| encode_err(e.to_string()))?;
    let creation_time = SystemTime::now();

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out);
    encoder.update_digest(&java_password(password.as_bytes()));
    encoder.update_digest(WHITENER_MESSAGE);
    for word in [MAGIC, VERSION_02, count] {
        encoder.write_u32(word).map_err(|e| encode_err(e.to_string()))?;
    }

    for (alias, entry) in store.entries() {
        let written = match entry {
            StoreEntry::TrustedCertificate(cert) => encoder.write_trusted_certificate_entry(
                alias,
                &TrustedCertificateEntry {
                    creation_time,
                    certificate: to_jks_cert(cert),
                },
            ),
            StoreEntry::PrivateKey { key, chain } => {
                let private_key = match key {
                    ProtectedKey::Sealed(blob) => blob.clone(),
                    ProtectedKey::Unsealed { pkcs8, password } => {
                        seal_key(pkcs8, password).map_err(|e| encode_err(format!("{alias}: {e}")))?
                    }
                };
                encoder.write_private_key_entry(
                    alias,
                    &PrivateKeyEntry {
                        creation_time,
                        private_key,
                        certificate_chain: chain.iter().map(to_jks_cert).collect(),
                    },
                )
            }
        };
        written.map_err(|e| encode_err(format!("{alias}: {e}")))?;
    }

    encoder.write_digest().map_err(|e| encode_err(e.to_string()))?;
    drop(encoder);
    Ok(out)
}

/// Seal PKCS#8 key bytes with the JDK key protector.
pub fn seal_key(pkcs8: &[u8], password: &str) -> std::result::Result<Vec<u8>, UnsealError> {
    keyprotector::encrypt(
        &mut jks::common::SystemRandom,
        pkcs8,
        password.as_bytes(),
        java_password,
    )
    .map_err(|e| UnsealError::Malformed(e.to_string()))
}

/// Recover PKCS#8 key bytes from a key-protector blob.
pub fn unseal_key(
    blob: &[u8],
    password: &str,
) -> std::result::Result<Zeroizing<Vec<u8>>, UnsealError> {
    if !is_protected_key_info(blob) {
        return Err(UnsealError::Malformed("not an EncryptedPrivateKeyInfo".into()));
    }
    keyprotector::decrypt(blob, password.as_bytes(), java_password)
        .map(Zeroizing::new)
        .map_err(|e| match e {
            KeyStoreError::InvalidDigest => UnsealError::WrongPassword,
            other => UnsealError::Malformed(other.to_string()),
        })
}

/// `SEQUENCE { SEQUENCE { OID, .. }, OCTET STRING }` with nothing trailing.
/// The key protector walks the blob by offset, so the shape is checked first.
fn is_protected_key_info(blob: &[u8]) -> bool {
    let Ok((rest, info)) = parse_der(blob) else {
        return false;
    };
    let Ok(parts) = info.as_sequence() else {
        return false;
    };
    rest.is_empty()
        && parts.len() == 2
        && parts[0].as_sequence().is_ok_and(|alg| alg.first().is_some_and(|oid| oid.as_oid().is_ok()))
        && parts[1].as_slice().is_ok()
}

/// Password as the JDK feeds it to SHA-1: two big-endian bytes per UTF-16
/// code unit.
fn java_password(password: &[u8]) -> Vec<u8> {
    String::from_utf8_lossy(password)
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect()
}

fn from_jks_cert(cert: jks::Certificate) -> StoredCertificate {
    StoredCertificate {
        cert_type: cert.cert_type,
        der: cert.content,
    }
}

fn to_jks_cert(cert: &StoredCertificate) -> jks::Certificate {
    jks::Certificate {
        cert_type: cert.cert_type.clone(),
        content: cert.der.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn sample_store() -> LoadedStore {
        let ca = testutil::self_signed("Sample Root CA");
        let leaf = testutil::self_signed("leaf.example.com");
        let mut store = LoadedStore::new(StoreFormat::Jks);
        store.insert("root", StoreEntry::TrustedCertificate(StoredCertificate::x509(ca.der)));
        store.insert(
            "server",
            StoreEntry::PrivateKey {
                key: ProtectedKey::unsealed(leaf.pkcs8, "keypass"),
                chain: vec![StoredCertificate::x509(leaf.der)],
            },
        );
        store
    }

    #[test]
    fn decodes_what_it_encodes() {
        let store = sample_store();
        let bytes = encode(&store, "storepass").unwrap();
        assert!(looks_like_jks(&bytes));

        let loaded = decode(Path::new("mem.jks"), &bytes, Some("storepass")).unwrap();
        assert_eq!(loaded.format(), StoreFormat::Jks);
        assert_eq!(loaded.aliases().collect::<Vec<_>>(), vec!["root", "server"]);
        assert_eq!(
            loaded.entry("root").unwrap().certificate(),
            store.entry("root").unwrap().certificate()
        );
    }

    #[test]
    fn readable_by_the_jks_keystore_api() {
        let bytes = encode(&sample_store(), "storepass").unwrap();
        let mut keystore = jks::KeyStore::new();
        keystore.load(bytes.as_slice(), b"storepass").unwrap();
        assert!(keystore.is_trusted_certificate_entry("root"));
        assert!(keystore.get_private_key_entry("server", b"keypass").is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let bytes = encode(&sample_store(), "storepass").unwrap();
        let err = decode(Path::new("mem.jks"), &bytes, Some("nope")).unwrap_err();
        assert!(err.is_bad_password());
    }

    #[test]
    fn no_password_skips_integrity_check() {
        let bytes = encode(&sample_store(), "storepass").unwrap();
        let loaded = decode(Path::new("mem.jks"), &bytes, None).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn tampered_body_fails_integrity() {
        let mut bytes = encode(&sample_store(), "storepass").unwrap();
        let idx = bytes.len() - 21;
        bytes[idx] ^= 0xff;
        assert!(decode(Path::new("mem.jks"), &bytes, Some("storepass"))
            .unwrap_err()
            .is_bad_password());
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = decode(Path::new("x.jks"), b"definitely not a keystore", None).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn truncated_entries_are_corrupt() {
        let bytes = encode(&sample_store(), "storepass").unwrap();
        let err = decode(Path::new("x.jks"), &bytes[..40], None).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let mut bytes = encode(&sample_store(), "storepass").unwrap();
        bytes[4..8].copy_from_slice(&7u32.to_be_bytes());
        let err = decode(Path::new("x.jks"), &bytes, None).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn key_protector_round_trip() {
        let key = b"pretend this is a PKCS#8 structure of odd length!".to_vec();
        let sealed = seal_key(&key, "changeit").unwrap();
        assert_eq!(unseal_key(&sealed, "changeit").unwrap().as_slice(), key.as_slice());
        assert_eq!(unseal_key(&sealed, "other").unwrap_err(), UnsealError::WrongPassword);
    }

    #[test]
    fn malformed_protected_key_is_reported() {
        for blob in [&b""[..], &[0x30, 0x00][..], &[0x30, 0x03, 0x04, 0x01, 0x00][..]] {
            assert!(matches!(
                unseal_key(blob, "changeit"),
                Err(UnsealError::Malformed(_))
            ));
        }
    }

    #[test]
    fn non_ascii_passwords_use_utf16() {
        assert_eq!(java_password("é".as_bytes()), vec![0x00, 0xe9]);
        let sealed = seal_key(b"some key material", "pässwörd").unwrap();
        assert!(unseal_key(&sealed, "pässwörd").is_ok());
    }

    #[test]
    fn sealed_keys_survive_the_container() {
        let bytes = encode(&sample_store(), "storepass").unwrap();
        let loaded = decode(Path::new("mem.jks"), &bytes, Some("storepass")).unwrap();
        let StoreEntry::PrivateKey { key, .. } = loaded.entry("server").unwrap() else {
            panic!("expected key entry");
        };
        assert!(matches!(key, ProtectedKey::Sealed(_)));
        assert!(key.unwrap("keypass").is_ok());
        assert!(key.unwrap("storepass").is_err());
    }
}
