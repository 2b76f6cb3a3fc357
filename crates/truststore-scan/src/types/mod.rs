//! Core types for trust-store discovery.

pub mod cert;
pub mod process;
pub mod report;
pub mod store;

pub use cert::{CertFingerprint, CertificateEntry, PrivateKeyEntry};
pub use process::{ProcessRecord, ProcessTrustConfig};
pub use report::{DiscoveryResult, ScanReport, ScanSummary, StoreLocation, StoreReport, StoreSource};
pub use store::{
    EntryKind, LoadedStore, ProtectedKey, StoreEntry, StoreFormat, StoredCertificate, UnsealError,
};
