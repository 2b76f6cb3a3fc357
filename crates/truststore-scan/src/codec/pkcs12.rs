//! PKCS#12 / PFX container codec, backed by `p12-keystore`.

use p12_keystore::error::Error as P12Error;
use p12_keystore::{Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};
use std::path::Path;

use super::jks;
use crate::error::{LoadError, Result, ScanError};
use crate::types::{LoadedStore, ProtectedKey, StoreEntry, StoreFormat, StoredCertificate};

/// Decode a PKCS#12 container. A missing password is tried as the empty
/// password, which opens stores written without integrity protection.
pub fn decode(
    path: &Path,
    data: &[u8],
    password: Option<&str>,
) -> std::result::Result<LoadedStore, LoadError> {
    if jks::looks_like_jks(data) {
        return Err(LoadError::corrupt(path, "JKS container, not PKCS#12"));
    }
    let password = password.unwrap_or_default();
    let keystore = KeyStore::from_pkcs12(data, password).map_err(|e| classify(path, &e))?;

    let mut store = LoadedStore::new(StoreFormat::Pkcs12);
    for (alias, entry) in keystore.entries() {
        let entry = match entry {
            KeyStoreEntry::Certificate(cert) => {
                StoreEntry::TrustedCertificate(StoredCertificate::x509(cert.as_der()))
            }
            KeyStoreEntry::PrivateKeyChain(chain) => StoreEntry::PrivateKey {
                key: ProtectedKey::unsealed(chain.key(), password),
                chain: chain
                    .chain()
                    .iter()
                    .map(|c| StoredCertificate::x509(c.as_der()))
                    .collect(),
            },
        };
        store.insert(alias.clone(), entry);
    }
    Ok(store)
}

/// Encode `store` as PKCS#12 protected by `password`.
///
/// The container protects keys and integrity with one password, so every
/// key must open with `password`; one that does not fails the whole encode.
pub fn encode(store: &LoadedStore, password: &str) -> Result<Vec<u8>> {
    let encode_err = |reason: String| ScanError::Encode {
        format: "PKCS12",
        reason,
    };

    let mut keystore = KeyStore::new();
    for (alias, entry) in store.entries() {
        let entry = match entry {
            StoreEntry::TrustedCertificate(cert) => KeyStoreEntry::Certificate(
                Certificate::from_der(&cert.der)
                    .map_err(|e| encode_err(format!("{alias}: {e}")))?,
            ),
            StoreEntry::PrivateKey { key, chain } => {
                let pkcs8 = key
                    .unwrap(password)
                    .map_err(|e| encode_err(format!("{alias}: {e}")))?;
                let certs = chain
                    .iter()
                    .map(|c| Certificate::from_der(&c.der))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| encode_err(format!("{alias}: {e}")))?;
                let id_source = chain.first().map_or(alias.as_bytes(), |c| c.der.as_slice());
                let local_key_id = digest(&SHA1_FOR_LEGACY_USE_ONLY, id_source);
                KeyStoreEntry::PrivateKeyChain(PrivateKeyChain::new(
                    pkcs8.as_slice(),
                    local_key_id.as_ref(),
                    certs,
                ))
            }
        };
        keystore.add_entry(alias, entry);
    }

    keystore
        .writer(password)
        .write()
        .map_err(|e| encode_err(e.to_string()))
}

/// Map a `p12-keystore` failure onto the load taxonomy.
fn classify(path: &Path, err: &P12Error) -> LoadError {
    match err {
        P12Error::MacError(_) | P12Error::UnpadError => LoadError::BadPassword {
            path: path.to_path_buf(),
        },
        P12Error::UnsupportedMacAlgorithm
        | P12Error::UnsupportedEncryptionScheme
        | P12Error::UnsupportedContentType => LoadError::UnsupportedFormat {
            format: format!("PKCS12 ({err})"),
        },
        other => LoadError::corrupt(path, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn sample_store() -> LoadedStore {
        let ca = testutil::self_signed("PKCS12 Root");
        let leaf = testutil::self_signed("client.example.org");
        let mut store = LoadedStore::new(StoreFormat::Pkcs12);
        store.insert("root", StoreEntry::TrustedCertificate(StoredCertificate::x509(ca.der)));
        store.insert(
            "client",
            StoreEntry::PrivateKey {
                key: ProtectedKey::unsealed(leaf.pkcs8, "secret"),
                chain: vec![StoredCertificate::x509(leaf.der)],
            },
        );
        store
    }

    #[test]
    fn decodes_what_it_encodes() {
        let store = sample_store();
        let bytes = encode(&store, "secret").unwrap();
        let loaded = decode(Path::new("mem.p12"), &bytes, Some("secret")).unwrap();

        assert_eq!(loaded.format(), StoreFormat::Pkcs12);
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.entry("root").unwrap().certificate(),
            store.entry("root").unwrap().certificate()
        );
        let StoreEntry::PrivateKey { key, chain } = loaded.entry("client").unwrap() else {
            panic!("expected key entry");
        };
        assert_eq!(chain.len(), 1);
        assert!(key.unwrap("secret").is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let bytes = encode(&sample_store(), "secret").unwrap();
        let err = decode(Path::new("mem.p12"), &bytes, Some("wrong")).unwrap_err();
        assert!(err.is_bad_password(), "got {err}");
    }

    #[test]
    fn jks_bytes_are_not_pkcs12() {
        let bytes = jks::encode(&sample_store(), "secret").unwrap();
        let err = decode(Path::new("mem.p12"), &bytes, Some("secret")).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn unsupported_algorithms_are_not_password_failures() {
        let path = Path::new("x.p12");
        for err in [
            P12Error::UnsupportedMacAlgorithm,
            P12Error::UnsupportedEncryptionScheme,
            P12Error::UnsupportedContentType,
        ] {
            let classified = classify(path, &err);
            assert!(!classified.is_bad_password(), "{err} -> {classified}");
            assert!(matches!(classified, LoadError::UnsupportedFormat { .. }));
        }
    }

    #[test]
    fn unpad_failure_means_wrong_password() {
        assert!(classify(Path::new("x.p12"), &P12Error::UnpadError).is_bad_password());
    }

    #[test]
    fn structural_failures_are_corrupt() {
        let path = Path::new("x.p12");
        for err in [P12Error::InvalidVersion, P12Error::InvalidData, P12Error::InvalidLength] {
            assert!(matches!(classify(path, &err), LoadError::Corrupt { .. }));
        }
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = decode(Path::new("x.p12"), &[0x30, 0x03, 0x02, 0x01, 0x09], Some("pw")).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }), "got {err}");
    }
}
