//! # truststore-scan
//!
//! Find every certificate trust store on a host, open it, and normalize its
//! content.
//!
//! Trust material is scattered: the OS has its stores, the managed runtime
//! ships its own CA bundle, services point at private keystores on their
//! command lines, and operators drop `.jks` / `.p12` files wherever they
//! like. This crate discovers all of them and reads them into one model.
//!
//! ## Data Flow
//!
//! ```text
//! Discovery (best effort, failures recorded as absent)
//!   native stores -> runtime CA bundle -> process trust stores -> filesystem roots
//!   -> DiscoveryResult (location -> Option<LoadedStore>)
//!
//! Loading
//!   load(path, format, password)          strict, one attempt
//!   try_load(path, format, password)      [password, none]
//!
//! Normalization
//!   extract::{certificates, chain_certificates, keys, trust_anchors}
//!   extract::filter_by_subject
//!   convert::to_canonical -> PKCS#12
//!   crl::verify -> issuing alias
//! ```

pub mod codec;
pub mod config;
pub mod convert;
pub mod crl;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod hash;
pub mod loader;
pub mod registry;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::ScanConfig;
pub use error::{LoadError, LoadErrorKind, Result, ScanError};
pub use loader::{load, try_load, try_load_any, try_load_detailed, FallbackLoad};
pub use registry::{instantiate, providers, TrustStoreVariant};
pub use types::*;

use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};

use discovery::RuntimeLocator;

/// Scan the host as `config` describes and report every store found.
///
/// Sources run in a fixed order: native stores, the runtime CA bundle,
/// process trust stores, then filesystem roots. A store that does not open
/// is reported with `loaded: false`; nothing here fails the whole scan.
#[must_use]
pub fn collect_report(config: &ScanConfig) -> ScanReport {
    let filter = config.subject_filter.as_deref();
    let password = config.password.as_deref();
    let mut stores = Vec::new();

    if config.native {
        for (location, store) in discovery::discover_native_stores() {
            stores.push(store_report(StoreSource::Native, location, None, store.as_ref(), filter));
        }
    }

    let locator = RuntimeLocator::from_env().with_home(config.runtime_home.clone());
    let runtime_home = locator.resolve_runtime_home();
    if config.runtime {
        for (location, store) in discovery::discover_runtime_bundle(&locator, password) {
            let path = location_path(&location);
            stores.push(store_report(StoreSource::RuntimeBundle, location, path, store.as_ref(), filter));
        }
    }

    if config.processes {
        match discovery::discover_process_trust_configs() {
            Ok(configs) => {
                let found = discovery::discover_process_stores(&configs, password);
                for process in &configs {
                    let location = StoreLocation::Process(process.pid);
                    let store = found.get(&location).and_then(Option::as_ref);
                    stores.push(store_report(
                        StoreSource::Process,
                        location,
                        Some(process.trust_store_path.clone()),
                        store,
                        filter,
                    ));
                }
            }
            Err(e) => warn!(error = %e, "process discovery failed"),
        }
    }

    if config.filesystem {
        for (location, store) in discovery::discover_filesystem_stores(&config.roots, password) {
            let path = location_path(&location);
            stores.push(store_report(StoreSource::Filesystem, location, path, store.as_ref(), filter));
        }
    }

    let summary = ScanSummary::from_stores(&stores);
    info!(
        stores = summary.total_stores,
        loaded = summary.loaded_stores,
        certificates = summary.total_certificates,
        "scan complete"
    );

    ScanReport {
        collected_at: Utc::now(),
        subject_filter: config.subject_filter.clone(),
        runtime_home,
        providers: providers().into_iter().map(str::to_string).collect(),
        stores,
        summary,
    }
}

fn store_report(
    source: StoreSource,
    location: StoreLocation,
    path: Option<PathBuf>,
    store: Option<&LoadedStore>,
    filter: Option<&str>,
) -> StoreReport {
    StoreReport {
        source,
        location,
        path,
        format: store.map(LoadedStore::format),
        loaded: store.is_some(),
        certificates: store
            .map(|s| extract::filter_by_subject(extract::certificates(s), filter))
            .unwrap_or_default(),
    }
}

fn location_path(location: &StoreLocation) -> Option<PathBuf> {
    match location {
        StoreLocation::File(path) => Some(path.clone()),
        StoreLocation::Native(_) | StoreLocation::Process(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProtectedKey, StoreEntry, StoredCertificate};
    use std::fs;
    use tempfile::TempDir;

    fn filesystem_only(root: &std::path::Path) -> ScanConfig {
        ScanConfig {
            roots: vec![root.to_path_buf()],
            native: false,
            runtime: false,
            processes: false,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn report_covers_loaded_and_failed_stores() {
        let dir = TempDir::new().unwrap();
        let mut store = LoadedStore::new(StoreFormat::Jks);
        for cn in ["Acme Root CA", "Other Root CA"] {
            let cert = testutil::self_signed(cn);
            store.insert(cn, StoreEntry::TrustedCertificate(StoredCertificate::x509(cert.der)));
        }
        fs::write(
            dir.path().join("trust.jks"),
            codec::encode(StoreFormat::Jks, &store, "changeit").unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("broken.p12"), b"junk").unwrap();

        let config = ScanConfig {
            subject_filter: Some("acme".into()),
            ..filesystem_only(dir.path())
        };
        let report = collect_report(&config);

        assert_eq!(report.summary.total_stores, 2);
        assert_eq!(report.summary.loaded_stores, 1);
        assert_eq!(report.summary.total_certificates, 1);
        let loaded = report.stores.iter().find(|s| s.loaded).unwrap();
        assert_eq!(loaded.source, StoreSource::Filesystem);
        assert_eq!(loaded.format, Some(StoreFormat::Jks));
        assert!(loaded.certificates[0].subject.contains("Acme Root CA"));
        assert_eq!(loaded.path.as_deref(), Some(dir.path().join("trust.jks").as_path()));
    }

    #[test]
    fn key_chains_are_not_reported_as_trusted() {
        let dir = TempDir::new().unwrap();
        let root = testutil::self_signed("Chain Root CA");
        let leaf = testutil::self_signed("svc.chain.test");
        let mut store = LoadedStore::new(StoreFormat::Jks);
        store.insert("root", StoreEntry::TrustedCertificate(StoredCertificate::x509(root.der.clone())));
        store.insert(
            "svc",
            StoreEntry::PrivateKey {
                key: ProtectedKey::unsealed(leaf.pkcs8, "changeit"),
                chain: vec![StoredCertificate::x509(leaf.der), StoredCertificate::x509(root.der)],
            },
        );
        fs::write(
            dir.path().join("mixed.jks"),
            codec::encode(StoreFormat::Jks, &store, "changeit").unwrap(),
        )
        .unwrap();

        let report = collect_report(&filesystem_only(dir.path()));
        let subjects: Vec<_> = report.stores[0]
            .certificates
            .iter()
            .map(|c| c.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["CN=Chain Root CA"]);
    }

    #[test]
    fn disabled_sources_are_not_scanned() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig {
            filesystem: false,
            ..filesystem_only(dir.path())
        };
        let report = collect_report(&config);
        assert!(report.stores.is_empty());
        assert!(report.providers.contains(&"PKCS12".to_string()));
    }

    #[test]
    fn report_serializes_without_der() {
        let dir = TempDir::new().unwrap();
        let cert = testutil::self_signed("Serialized CA");
        fs::write(dir.path().join("a.pem"), &cert.pem).unwrap();
        let mut store = LoadedStore::new(StoreFormat::Pkcs12);
        store.insert("a", StoreEntry::TrustedCertificate(StoredCertificate::x509(cert.der)));
        fs::write(dir.path().join("a.p12"), store.to_pkcs12_bytes("").unwrap()).unwrap();

        let report = collect_report(&filesystem_only(dir.path()));
        let json = serde_json::to_value(&report).unwrap();
        let cert_json = &json["stores"][0]["certificates"][0];
        assert!(cert_json["subject"].as_str().unwrap().contains("Serialized CA"));
        assert!(cert_json.get("der").is_none());
    }
}
