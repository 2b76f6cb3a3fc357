//! Error types for store loading and discovery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a single store could not be opened.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Path does not exist or is not a regular file (or directory, for
    /// directory-backed stores)
    #[error("store not found: {}", path.display())]
    NotFound {
        /// Location that was probed
        path: PathBuf,
    },

    /// I/O or permission failure while reading the store
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        /// Location that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Integrity check or decryption rejected the supplied password
    #[error("password rejected for {}", path.display())]
    BadPassword {
        /// Store that rejected the password
        path: PathBuf,
    },

    /// Format identifier is not one this engine can open
    #[error("unsupported store format: {format}")]
    UnsupportedFormat {
        /// The identifier as supplied by the caller
        format: String,
    },

    /// Container opened but its content is malformed
    #[error("corrupt store {}: {reason}", path.display())]
    Corrupt {
        /// Store with the malformed content
        path: PathBuf,
        /// What could not be parsed
        reason: String,
    },
}

/// Bare taxonomy tag of a [`LoadError`], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    NotFound,
    Unreadable,
    BadPassword,
    UnsupportedFormat,
    Corrupt,
}

impl LoadError {
    /// Build an `Unreadable` error, mapping `NotFound` I/O errors to
    /// [`LoadError::NotFound`].
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Unreadable { path, source }
        }
    }

    /// Build a `Corrupt` error.
    pub fn corrupt(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Returns the taxonomy tag of this error.
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::NotFound { .. } => LoadErrorKind::NotFound,
            Self::Unreadable { .. } => LoadErrorKind::Unreadable,
            Self::BadPassword { .. } => LoadErrorKind::BadPassword,
            Self::UnsupportedFormat { .. } => LoadErrorKind::UnsupportedFormat,
            Self::Corrupt { .. } => LoadErrorKind::Corrupt,
        }
    }

    /// Returns true if the store rejected the password.
    #[must_use]
    pub const fn is_bad_password(&self) -> bool {
        matches!(self, Self::BadPassword { .. })
    }
}

/// Errors raised outside a single-store load.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A store that was explicitly requested failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// File I/O failure with path context
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process table could not be enumerated
    #[error("process table unavailable: {0}")]
    Procfs(String),

    /// A CRL file could not be decoded
    #[error("failed to parse CRL in {path}: {reason}")]
    CrlParse {
        /// Source file
        path: String,
        /// Parser message
        reason: String,
    },

    /// A store could not be serialized
    #[error("failed to encode {format} store: {reason}")]
    Encode {
        /// Target container format
        format: &'static str,
        /// Encoder message
        reason: String,
    },
}

impl ScanError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = LoadError::io(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.kind(), LoadErrorKind::NotFound);
    }

    #[test]
    fn io_permission_maps_to_unreadable() {
        let err = LoadError::io(
            "/root/secret.jks",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), LoadErrorKind::Unreadable);
        assert!(err.to_string().contains("/root/secret.jks"));
    }
}
