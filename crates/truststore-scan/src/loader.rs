//! Store loading with the no-password fallback.
//!
//! Real-world keystores are often protected by an empty or conventional
//! password that the operator does not know. Every best-effort load first
//! tries the supplied password and then, once, no password at all.

use std::path::Path;
use tracing::debug;

use crate::codec;
use crate::error::LoadError;
use crate::types::{LoadedStore, StoreFormat};

/// Open the store file at `path` as `format`.
///
/// # Errors
///
/// `NotFound` if `path` is not a regular file, `Unreadable` on I/O failure,
/// `UnsupportedFormat` for non-file formats, and `BadPassword` / `Corrupt`
/// from the codec.
pub fn load(
    path: &Path,
    format: StoreFormat,
    password: Option<&str>,
) -> Result<LoadedStore, LoadError> {
    if !format.is_file_backed() {
        return Err(LoadError::UnsupportedFormat {
            format: format.name().to_string(),
        });
    }
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let data = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    codec::decode(format, path, &data, password)
}

/// Outcome of a load with fallback, keeping the supplied-password failure
/// visible next to the final result.
#[derive(Debug)]
pub struct FallbackLoad {
    /// The opened store, if any attempt succeeded
    pub store: Option<LoadedStore>,
    /// Why the supplied password failed (None if it worked or none was given)
    pub first_error: Option<LoadError>,
    /// Error of the no-password retry, when it also failed
    pub fallback_error: Option<LoadError>,
    /// Whether the store only opened on the no-password retry
    pub used_fallback: bool,
}

impl FallbackLoad {
    /// The most informative error when nothing opened.
    #[must_use]
    pub fn error(&self) -> Option<&LoadError> {
        if self.store.is_some() {
            return None;
        }
        self.first_error.as_ref().or(self.fallback_error.as_ref())
    }
}

/// Load with the supplied password, then retry once without one.
pub fn try_load_detailed(
    path: &Path,
    format: StoreFormat,
    password: Option<&str>,
) -> FallbackLoad {
    let attempts = if password.is_some() {
        vec![password, None]
    } else {
        vec![None]
    };

    let mut outcome = FallbackLoad {
        store: None,
        first_error: None,
        fallback_error: None,
        used_fallback: false,
    };
    for (i, attempt) in attempts.iter().enumerate() {
        match load(path, format, *attempt) {
            Ok(store) => {
                outcome.used_fallback = i > 0;
                outcome.store = Some(store);
                break;
            }
            Err(e) => {
                debug!(
                    path = %path.display(),
                    format = %format,
                    with_password = attempt.is_some(),
                    error = %e,
                    "load attempt failed"
                );
                if i == 0 && attempt.is_some() {
                    outcome.first_error = Some(e);
                } else {
                    outcome.fallback_error = Some(e);
                }
            }
        }
    }
    outcome
}

/// Best-effort load: `None` if neither attempt opened the store.
pub fn try_load(path: &Path, format: StoreFormat, password: Option<&str>) -> Option<LoadedStore> {
    try_load_detailed(path, format, password).store
}

/// Best-effort load trying each of `formats` in order.
pub fn try_load_any(
    path: &Path,
    formats: &[StoreFormat],
    password: Option<&str>,
) -> Option<LoadedStore> {
    formats
        .iter()
        .find_map(|&format| try_load(path, format, password))
}
