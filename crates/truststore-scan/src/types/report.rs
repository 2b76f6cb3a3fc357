//! Discovery results and the point-in-time scan report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::cert::CertificateEntry;
use super::store::{LoadedStore, StoreFormat};

/// Where a discovered store lives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StoreLocation {
    /// OS store, by provider id
    Native(String),
    /// Store file or directory on disk
    File(PathBuf),
    /// Store configured by a running process
    Process(i32),
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(name) => write!(f, "native:{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Process(pid) => write!(f, "pid:{pid}"),
        }
    }
}

/// Discovered stores by location; `None` marks a store that failed to load.
pub type DiscoveryResult = BTreeMap<StoreLocation, Option<LoadedStore>>;

/// Which discovery source produced a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSource {
    /// OS-native trust store
    Native,
    /// CA bundle shipped with the managed runtime
    RuntimeBundle,
    /// Trust store named on a process command line
    Process,
    /// Keystore file found under a scan root
    Filesystem,
}

/// One store as it appears in a scan report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreReport {
    /// Discovery source
    pub source: StoreSource,
    /// Location identifier
    pub location: StoreLocation,
    /// Backing file, when the location is not itself a path
    pub path: Option<PathBuf>,
    /// Format the store opened as (None if it did not open)
    pub format: Option<StoreFormat>,
    /// Whether the store opened
    pub loaded: bool,
    /// Trusted-certificate entries that passed the subject filter
    pub certificates: Vec<CertificateEntry>,
}

/// Complete result of a host scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// When this report was collected
    pub collected_at: DateTime<Utc>,
    /// Subject filter applied to every store
    pub subject_filter: Option<String>,
    /// Resolved runtime installation root
    pub runtime_home: Option<PathBuf>,
    /// Store provider ids available during the scan
    pub providers: Vec<String>,
    /// Every store that was looked at
    pub stores: Vec<StoreReport>,
    /// Summary statistics
    pub summary: ScanSummary,
}

/// Summary statistics for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Stores discovered
    pub total_stores: usize,
    /// Stores that opened
    pub loaded_stores: usize,
    /// Stores that failed to open
    pub failed_stores: usize,
    /// Certificates reported (after filtering)
    pub total_certificates: usize,
    /// Reported certificates past their not-after date
    pub expired_certificates: usize,
}

impl ScanSummary {
    /// Build summary from store reports.
    #[must_use]
    pub fn from_stores(stores: &[StoreReport]) -> Self {
        let loaded_stores = stores.iter().filter(|s| s.loaded).count();
        Self {
            total_stores: stores.len(),
            loaded_stores,
            failed_stores: stores.len() - loaded_stores,
            total_certificates: stores.iter().map(|s| s.certificates.len()).sum(),
            expired_certificates: stores
                .iter()
                .flat_map(|s| &s.certificates)
                .filter(|c| c.expired)
                .count(),
        }
    }
}
