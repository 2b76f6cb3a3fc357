//! In-memory store model shared by every container format.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::codec::jks;
use crate::error::LoadError;

/// Container kinds the engine can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFormat {
    /// Legacy Java keystore
    Jks,
    /// PKCS#12 / PFX
    Pkcs12,
    /// Directory of PEM files, one trust anchor per file
    Directory,
    /// Platform user trust store
    NativeUser,
    /// Platform root trust store
    NativeSystem,
}

impl StoreFormat {
    /// The single interoperable format every store can be converted into.
    pub const CANONICAL: Self = Self::Pkcs12;

    /// File-backed formats, in the order they are tried when nothing is known.
    pub const FILE_FORMATS: &'static [Self] = &[Self::Jks, Self::Pkcs12];

    /// Provider identifier for this format on the current platform.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jks => "JKS",
            Self::Pkcs12 => "PKCS12",
            Self::Directory => "Directory",
            Self::NativeUser => {
                if cfg!(windows) {
                    "Windows-MY"
                } else if cfg!(target_os = "macos") {
                    "KeychainStore"
                } else {
                    "Native-User"
                }
            }
            Self::NativeSystem => {
                if cfg!(windows) {
                    "Windows-ROOT"
                } else if cfg!(target_os = "macos") {
                    "KeychainStore-ROOT"
                } else {
                    "Native-ROOT"
                }
            }
        }
    }

    /// Returns true for formats backed by a single file.
    #[must_use]
    pub const fn is_file_backed(self) -> bool {
        matches!(self, Self::Jks | Self::Pkcs12)
    }

    /// File formats to try for `path`, most likely first.
    ///
    /// The extension only reorders the candidates; both file formats are
    /// always returned because keystores are routinely misnamed.
    #[must_use]
    pub fn candidates_for(path: &Path) -> Vec<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("p12" | "pfx") => vec![Self::Pkcs12, Self::Jks],
            _ => Self::FILE_FORMATS.to_vec(),
        }
    }
}

impl std::fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StoreFormat {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jks" => Ok(Self::Jks),
            "pkcs12" | "p12" | "pfx" => Ok(Self::Pkcs12),
            "directory" => Ok(Self::Directory),
            _ => Err(LoadError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Kind of an alias in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Trusted certificate entry
    Certificate,
    /// Key entry without certificates
    Key,
    /// Key entry carrying a certificate chain
    Chain,
}

impl EntryKind {
    /// Returns true for both key kinds.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::Key | Self::Chain)
    }
}

/// Raw certificate as stored in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCertificate {
    /// Certificate type tag (`X.509` for everything this engine writes)
    pub cert_type: String,
    /// Encoded certificate bytes
    pub der: Vec<u8>,
}

impl StoredCertificate {
    /// Wrap DER bytes of an X.509 certificate.
    pub fn x509(der: impl Into<Vec<u8>>) -> Self {
        Self {
            cert_type: "X.509".to_string(),
            der: der.into(),
        }
    }

    /// Returns true if the stored type tag names X.509.
    #[must_use]
    pub fn is_x509(&self) -> bool {
        self.cert_type.eq_ignore_ascii_case("X.509") || self.cert_type.eq_ignore_ascii_case("X509")
    }
}

/// Why a key could not be unwrapped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsealError {
    /// The password does not open this key
    #[error("key password rejected")]
    WrongPassword,
    /// The protected blob is malformed
    #[error("malformed protected key: {0}")]
    Malformed(String),
}

/// Private key material as held by a loaded store.
#[derive(Clone, PartialEq, Eq)]
pub enum ProtectedKey {
    /// JDK key-protector `EncryptedPrivateKeyInfo`, unwrapped on demand
    Sealed(Vec<u8>),
    /// Key already decrypted at load time, together with the password that
    /// protects it
    Unsealed {
        /// PKCS#8 `PrivateKeyInfo`
        pkcs8: Zeroizing<Vec<u8>>,
        /// Password guarding the key
        password: Zeroizing<String>,
    },
}

impl ProtectedKey {
    /// Protect already-decrypted key material with `password`.
    pub fn unsealed(pkcs8: impl Into<Vec<u8>>, password: &str) -> Self {
        Self::Unsealed {
            pkcs8: Zeroizing::new(pkcs8.into()),
            password: Zeroizing::new(password.to_string()),
        }
    }

    /// Recover the PKCS#8 key bytes with `password`.
    pub fn unwrap(&self, password: &str) -> Result<Zeroizing<Vec<u8>>, UnsealError> {
        match self {
            Self::Sealed(blob) => jks::unseal_key(blob, password),
            Self::Unsealed {
                pkcs8,
                password: expected,
            } => {
                if expected.as_str() == password {
                    Ok(pkcs8.clone())
                } else {
                    Err(UnsealError::WrongPassword)
                }
            }
        }
    }
}

impl std::fmt::Debug for ProtectedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sealed(blob) => write!(f, "Sealed({} bytes)", blob.len()),
            Self::Unsealed { pkcs8, .. } => write!(f, "Unsealed({} bytes)", pkcs8.len()),
        }
    }
}

/// One aliased entry of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEntry {
    /// A trust anchor
    TrustedCertificate(StoredCertificate),
    /// A private key with its certificate chain (leaf first)
    PrivateKey {
        /// Protected key material
        key: ProtectedKey,
        /// Certificate chain, possibly empty
        chain: Vec<StoredCertificate>,
    },
}

impl StoreEntry {
    /// Kind of this entry.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::TrustedCertificate(_) => EntryKind::Certificate,
            Self::PrivateKey { chain, .. } if chain.is_empty() => EntryKind::Key,
            Self::PrivateKey { .. } => EntryKind::Chain,
        }
    }

    /// The entry's own certificate: the anchor, or the leaf of a key chain.
    #[must_use]
    pub fn certificate(&self) -> Option<&StoredCertificate> {
        match self {
            Self::TrustedCertificate(cert) => Some(cert),
            Self::PrivateKey { chain, .. } => chain.first(),
        }
    }

    /// Every certificate the entry holds.
    #[must_use]
    pub fn chain(&self) -> &[StoredCertificate] {
        match self {
            Self::TrustedCertificate(cert) => std::slice::from_ref(cert),
            Self::PrivateKey { chain, .. } => chain,
        }
    }
}

/// An opened store: a format tag plus uniquely aliased entries.
///
/// Entries keep the order the container yielded them in; that order is what
/// "first" means for lookups such as CRL issuer matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedStore {
    format: StoreFormat,
    entries: Vec<(String, StoreEntry)>,
}

impl LoadedStore {
    /// Create an empty store of the given format.
    #[must_use]
    pub const fn new(format: StoreFormat) -> Self {
        Self {
            format,
            entries: Vec::new(),
        }
    }

    /// Container format of this store.
    #[must_use]
    pub const fn format(&self) -> StoreFormat {
        self.format
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add or replace the entry under `alias`.
    pub fn insert(&mut self, alias: impl Into<String>, entry: StoreEntry) {
        let alias = alias.into();
        if let Some(slot) = self.entries.iter_mut().find(|(a, _)| *a == alias) {
            slot.1 = entry;
        } else {
            self.entries.push((alias, entry));
        }
    }

    /// Aliases in enumeration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &StoreEntry)> {
        self.entries.iter().map(|(alias, entry)| (alias.as_str(), entry))
    }

    /// Entry stored under `alias`.
    #[must_use]
    pub fn entry(&self, alias: &str) -> Option<&StoreEntry> {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, entry)| entry)
    }

    /// Kind of the entry under `alias`.
    #[must_use]
    pub fn entry_kind(&self, alias: &str) -> Option<EntryKind> {
        self.entry(alias).map(StoreEntry::kind)
    }
}
