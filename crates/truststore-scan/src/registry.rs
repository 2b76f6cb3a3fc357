//! Trust-store variants and their instantiation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::codec::pem_dir;
use crate::discovery::native;
use crate::error::LoadError;
use crate::loader;
use crate::types::{LoadedStore, StoreFormat};

/// Set once the directory-aggregation provider has been registered.
static DIRECTORY_PROVIDER: AtomicBool = AtomicBool::new(false);

/// The closed set of store kinds the engine can open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrustStoreVariant {
    /// Platform user trust store
    NativeUser,
    /// Platform root trust store
    NativeSystem,
    /// Directory of PEM files
    Directory(PathBuf),
    /// Keystore file of a declared format
    File {
        /// Store file
        path: PathBuf,
        /// Caller-declared container format
        format: StoreFormat,
    },
}

impl TrustStoreVariant {
    /// Format backing this variant.
    #[must_use]
    pub const fn format(&self) -> StoreFormat {
        match self {
            Self::NativeUser => StoreFormat::NativeUser,
            Self::NativeSystem => StoreFormat::NativeSystem,
            Self::Directory(_) => StoreFormat::Directory,
            Self::File { format, .. } => *format,
        }
    }

    /// Provider identifier used to instantiate the backing store.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.format().name()
    }
}

/// Register the directory-aggregation provider.
///
/// Returns `true` only for the call that performed the registration; every
/// later call is a no-op.
pub fn register_directory_provider() -> bool {
    let first = !DIRECTORY_PROVIDER.swap(true, Ordering::AcqRel);
    if first {
        debug!(provider = StoreFormat::Directory.name(), "registered store provider");
    }
    first
}

/// Returns true once the directory provider is registered.
pub fn directory_provider_registered() -> bool {
    DIRECTORY_PROVIDER.load(Ordering::Acquire)
}

/// Distinct provider ids the engine can open right now.
pub fn providers() -> Vec<&'static str> {
    let mut names = vec![
        StoreFormat::Jks.name(),
        StoreFormat::Pkcs12.name(),
        StoreFormat::NativeUser.name(),
        StoreFormat::NativeSystem.name(),
    ];
    if directory_provider_registered() {
        names.push(StoreFormat::Directory.name());
    }
    names
}

/// Open the store a variant describes.
///
/// Native variants never fail; on platforms without an accessor they yield
/// an empty store. File variants are opened without a password; use the
/// [`loader`] functions to supply one.
pub fn instantiate(variant: &TrustStoreVariant) -> Result<LoadedStore, LoadError> {
    match variant {
        TrustStoreVariant::Directory(path) => {
            register_directory_provider();
            pem_dir::load_directory(path)
        }
        TrustStoreVariant::NativeUser => Ok(native::load_user_store()),
        TrustStoreVariant::NativeSystem => Ok(native::load_system_store()),
        TrustStoreVariant::File { path, format } => loader::load(path, *format, None),
    }
}
