//! Store discovery: native stores, the runtime bundle, running processes and
//! filesystem roots.

pub mod files;
pub mod native;
pub mod processes;
pub mod runtime;

pub use files::{scan, DEFAULT_SCAN_ROOTS, KEYSTORE_EXTENSIONS};
pub use processes::{discover_process_trust_configs, extract_trust_config, list_candidate_processes, parse_trust_args};
pub use runtime::RuntimeLocator;

use std::path::Path;
use tracing::debug;

use crate::loader;
use crate::registry::{self, TrustStoreVariant};
use crate::types::{DiscoveryResult, LoadedStore, ProcessTrustConfig, StoreFormat, StoreLocation};

/// Both OS-native stores, keyed by provider id.
pub fn discover_native_stores() -> DiscoveryResult {
    [TrustStoreVariant::NativeUser, TrustStoreVariant::NativeSystem]
        .into_iter()
        .map(|variant| {
            let location = StoreLocation::Native(variant.provider().to_string());
            (location, registry::instantiate(&variant).ok())
        })
        .collect()
}

/// The managed runtime's bundled CA store, if one is installed.
pub fn discover_runtime_bundle(locator: &RuntimeLocator, password: Option<&str>) -> DiscoveryResult {
    let Some(bundle) = locator.resolve_bundled_ca_bundle() else {
        debug!("no runtime CA bundle found");
        return DiscoveryResult::new();
    };
    let store = loader::try_load_any(&bundle, StoreFormat::FILE_FORMATS, password);
    DiscoveryResult::from([(StoreLocation::File(bundle), store)])
}

/// Formats to try for a process's trust store: its declared type first,
/// then the path-based candidates.
#[must_use]
pub fn process_store_formats(config: &ProcessTrustConfig) -> Vec<StoreFormat> {
    let mut formats = StoreFormat::candidates_for(&config.trust_store_path);
    if let Some(declared) = config
        .trust_store_type
        .as_deref()
        .and_then(|t| t.parse::<StoreFormat>().ok())
        .filter(|f| f.is_file_backed())
    {
        formats.retain(|f| *f != declared);
        formats.insert(0, declared);
    }
    formats
}

/// Open one process's trust store with its own password, else `password`.
pub fn load_process_store(config: &ProcessTrustConfig, password: Option<&str>) -> Option<LoadedStore> {
    let password = config.trust_store_password.as_deref().or(password);
    loader::try_load_any(&config.trust_store_path, &process_store_formats(config), password)
}

/// Trust stores named by running processes, keyed by pid.
pub fn discover_process_stores(configs: &[ProcessTrustConfig], password: Option<&str>) -> DiscoveryResult {
    configs
        .iter()
        .map(|config| {
            let store = load_process_store(config, password);
            if store.is_none() {
                debug!(
                    pid = config.pid,
                    path = %config.trust_store_path.display(),
                    "process trust store did not open"
                );
            }
            (StoreLocation::Process(config.pid), store)
        })
        .collect()
}

/// Keystore files under `roots`, keyed by path.
pub fn discover_filesystem_stores<P: AsRef<Path>>(roots: &[P], password: Option<&str>) -> DiscoveryResult {
    scan(roots, password)
        .into_iter()
        .map(|(path, store)| (StoreLocation::File(path), store))
        .collect()
}
