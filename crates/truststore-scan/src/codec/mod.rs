//! Container codecs, one per store format.

pub mod jks;
pub mod pem_dir;
pub mod pkcs12;

use std::path::Path;

use crate::error::{LoadError, Result};
use crate::types::{LoadedStore, StoreFormat};

/// Decode file bytes as `format`.
pub fn decode(
    format: StoreFormat,
    path: &Path,
    data: &[u8],
    password: Option<&str>,
) -> std::result::Result<LoadedStore, LoadError> {
    match format {
        StoreFormat::Jks => jks::decode(path, data, password),
        StoreFormat::Pkcs12 => pkcs12::decode(path, data, password),
        other => Err(LoadError::UnsupportedFormat {
            format: other.name().to_string(),
        }),
    }
}

/// Encode `store` as a `format` file protected by `password`.
pub fn encode(format: StoreFormat, store: &LoadedStore, password: &str) -> Result<Vec<u8>> {
    match format {
        StoreFormat::Jks => jks::encode(store, password),
        StoreFormat::Pkcs12 => pkcs12::encode(store, password),
        other => Err(LoadError::UnsupportedFormat {
            format: other.name().to_string(),
        }
        .into()),
    }
}
