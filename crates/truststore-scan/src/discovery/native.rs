//! OS-native trust stores via `rustls-native-certs`.

use tracing::{debug, info, warn};

use crate::hash::sha256_bytes;
use crate::types::{LoadedStore, StoreEntry, StoreFormat, StoredCertificate};

/// Load the platform root trust store.
///
/// Per-certificate and per-source errors reported by the platform are
/// logged; whatever did load is returned. Aliases are SHA-256 fingerprints.
pub fn load_system_store() -> LoadedStore {
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        warn!(error = %err, "native trust store reported an error");
    }

    let mut store = LoadedStore::new(StoreFormat::NativeSystem);
    for cert in &result.certs {
        let der: &[u8] = cert.as_ref();
        store.insert(
            sha256_bytes(der),
            StoreEntry::TrustedCertificate(StoredCertificate::x509(der)),
        );
    }
    info!(
        provider = StoreFormat::NativeSystem.name(),
        certs = store.len(),
        "loaded native trust store"
    );
    store
}

/// Load the platform user trust store.
///
/// There is no portable accessor for a user-scoped store, so this is always
/// empty.
pub fn load_user_store() -> LoadedStore {
    debug!(
        provider = StoreFormat::NativeUser.name(),
        "no user trust store accessor on this platform"
    );
    LoadedStore::new(StoreFormat::NativeUser)
}
