//! Conversion into the canonical (PKCS#12) container.

use regex::Regex;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

use crate::codec::pkcs12;
use crate::error::{LoadError, Result, ScanError};
use crate::types::{LoadedStore, ProtectedKey, StoreEntry, StoreFormat};

/// Alias filter that must match a whole alias, not a substring of it.
#[derive(Debug, Clone)]
pub struct AliasPattern(Regex);

impl AliasPattern {
    /// Compile `pattern` anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self)
    }

    /// Returns true if the pattern matches all of `alias`.
    #[must_use]
    pub fn matches(&self, alias: &str) -> bool {
        self.0.is_match(alias)
    }
}

/// Convert `store` into the canonical format.
///
/// A store already in the canonical format comes back borrowed and
/// untouched. Otherwise a new store receives every alias matching
/// `alias_pattern` (all aliases when `None`); key entries are opened with
/// `key_password` (empty when `None`) and protected with it again.
///
/// # Errors
///
/// `LoadError::Corrupt` if a selected key entry cannot be read.
pub fn to_canonical<'a>(
    store: &'a LoadedStore,
    key_password: Option<&str>,
    alias_pattern: Option<&AliasPattern>,
) -> std::result::Result<Cow<'a, LoadedStore>, LoadError> {
    if store.format() == StoreFormat::CANONICAL {
        return Ok(Cow::Borrowed(store));
    }

    let key_password = key_password.unwrap_or_default();
    let mut canonical = LoadedStore::new(StoreFormat::CANONICAL);
    for (alias, entry) in store.entries() {
        if alias_pattern.is_some_and(|p| !p.matches(alias)) {
            debug!(alias, "alias excluded by pattern");
            continue;
        }
        let copied = match entry {
            StoreEntry::TrustedCertificate(cert) => StoreEntry::TrustedCertificate(cert.clone()),
            StoreEntry::PrivateKey { key, chain } => {
                let pkcs8 = key.unwrap(key_password).map_err(|e| {
                    LoadError::corrupt(format!("{}#{alias}", store.format()), e.to_string())
                })?;
                StoreEntry::PrivateKey {
                    key: ProtectedKey::unsealed(pkcs8.as_slice(), key_password),
                    chain: chain.clone(),
                }
            }
        };
        canonical.insert(alias, copied);
    }

    info!(
        from = %store.format(),
        to = %StoreFormat::CANONICAL,
        entries = canonical.len(),
        "converted store"
    );
    Ok(Cow::Owned(canonical))
}

impl LoadedStore {
    /// Serialize this store as a PKCS#12 file protected by `password`.
    ///
    /// Every key must open with `password`, since PKCS#12 protects keys with
    /// the container password.
    ///
    /// # Errors
    ///
    /// `ScanError::Encode` if an entry cannot be written.
    pub fn to_pkcs12_bytes(&self, password: &str) -> Result<Vec<u8>> {
        pkcs12::encode(self, password)
    }
}

/// Write `store` to `path` as a canonical PKCS#12 file.
///
/// For a store from [`to_canonical`], `password` must be the key password
/// the conversion used.
///
/// # Errors
///
/// `ScanError::Encode` if an entry cannot be written or a key is protected
/// by another password, `ScanError::Io` if the file cannot be created.
pub fn write_canonical(store: &LoadedStore, path: &Path, password: &str) -> Result<()> {
    let bytes = store.to_pkcs12_bytes(password)?;
    std::fs::write(path, bytes).map_err(|e| ScanError::io(path.display().to_string(), e))?;
    info!(path = %path.display(), entries = store.len(), "wrote canonical store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::jks;
    use crate::extract;
    use crate::loader;
    use crate::testutil;
    use crate::types::StoredCertificate;
    use tempfile::TempDir;

    fn jks_store(key_password: &str) -> LoadedStore {
        let root = testutil::self_signed("Convert Root");
        let leaf = testutil::self_signed("svc.convert.test");
        let mut store = LoadedStore::new(StoreFormat::Jks);
        store.insert("root", StoreEntry::TrustedCertificate(StoredCertificate::x509(root.der.clone())));
        store.insert(
            "svc-key",
            StoreEntry::PrivateKey {
                key: ProtectedKey::Sealed(jks::seal_key(&leaf.pkcs8, key_password).unwrap()),
                chain: vec![
                    StoredCertificate::x509(leaf.der.clone()),
                    StoredCertificate::x509(root.der),
                ],
            },
        );
        store
    }

    #[test]
    fn canonical_store_is_returned_as_is() {
        let mut store = LoadedStore::new(StoreFormat::Pkcs12);
        let cert = testutil::self_signed("Already Canonical");
        store.insert("a", StoreEntry::TrustedCertificate(StoredCertificate::x509(cert.der)));

        let converted = to_canonical(&store, Some("ignored"), None).unwrap();
        assert!(matches!(converted, Cow::Borrowed(s) if std::ptr::eq(s, &store)));
    }

    #[test]
    fn jks_converts_with_keys_reprotected() {
        let store = jks_store("keypw");
        let converted = to_canonical(&store, Some("keypw"), None).unwrap();

        assert_eq!(converted.format(), StoreFormat::Pkcs12);
        assert_eq!(converted.aliases().collect::<Vec<_>>(), vec!["root", "svc-key"]);
        assert_eq!(extract::keys(&converted, "keypw").len(), 1);
        assert_eq!(
            extract::chain_certificates(&converted),
            extract::chain_certificates(&store)
        );
    }

    #[test]
    fn repeated_conversion_yields_identical_entries() {
        let store = jks_store("keypw");
        let first = to_canonical(&store, Some("keypw"), None).unwrap();
        let second = to_canonical(&store, Some("keypw"), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn alias_pattern_must_match_whole_alias() {
        let store = jks_store("keypw");
        let pattern = AliasPattern::new("svc").unwrap();
        let converted = to_canonical(&store, Some("keypw"), Some(&pattern)).unwrap();
        assert!(converted.is_empty());

        let pattern = AliasPattern::new("svc-.*").unwrap();
        let converted = to_canonical(&store, Some("keypw"), Some(&pattern)).unwrap();
        assert_eq!(converted.aliases().collect::<Vec<_>>(), vec!["svc-key"]);
    }

    #[test]
    fn unreadable_key_is_corrupt() {
        let store = jks_store("keypw");
        let err = to_canonical(&store, Some("wrong"), None).unwrap_err();
        assert!(matches!(err, LoadError::Corrupt { .. }));
    }

    #[test]
    fn excluded_unreadable_key_does_not_fail() {
        let store = jks_store("keypw");
        let only_root = AliasPattern::new("root").unwrap();
        let converted = to_canonical(&store, Some("wrong"), Some(&only_root)).unwrap();
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn written_canonical_file_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.p12");
        let store = jks_store("pw");
        let converted = to_canonical(&store, Some("pw"), None).unwrap();
        write_canonical(&converted, &path, "pw").unwrap();

        let loaded = loader::load(&path, StoreFormat::Pkcs12, Some("pw")).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(extract::certificates(&loaded).len(), 1);
        assert_eq!(extract::keys(&loaded, "pw").len(), 1);
    }

    #[test]
    fn written_keys_keep_the_conversion_key_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.p12");
        let store = jks_store("keypw");
        let converted = to_canonical(&store, Some("keypw"), None).unwrap();

        let err = write_canonical(&converted, &path, "storepw").unwrap_err();
        assert!(matches!(err, ScanError::Encode { .. }), "got {err}");
        assert!(!path.exists());

        write_canonical(&converted, &path, "keypw").unwrap();
        let loaded = loader::load(&path, StoreFormat::Pkcs12, Some("keypw")).unwrap();
        assert_eq!(extract::keys(&loaded, "keypw").len(), 1);
        assert!(extract::keys(&loaded, "storepw").is_empty());
    }
}
