//! Scan configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::DEFAULT_SCAN_ROOTS;

/// What a host scan looks at and how it opens stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories walked for keystore files
    pub roots: Vec<PathBuf>,
    /// Case-insensitive subject substring every reported certificate must contain
    pub subject_filter: Option<String>,
    /// Password tried on every store before the no-password fallback
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Runtime home overriding `JAVA_HOME`
    pub runtime_home: Option<PathBuf>,
    /// Scan the OS-native stores
    pub native: bool,
    /// Scan the managed runtime's bundled CA store
    pub runtime: bool,
    /// Scan trust stores named by running processes
    pub processes: bool,
    /// Walk `roots` for keystore files
    pub filesystem: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: DEFAULT_SCAN_ROOTS.iter().map(PathBuf::from).collect(),
            subject_filter: None,
            password: None,
            runtime_home: None,
            native: true,
            runtime: true,
            processes: true,
            filesystem: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_source() {
        let config = ScanConfig::default();
        assert!(config.native && config.runtime && config.processes && config.filesystem);
        assert_eq!(config.roots, vec![PathBuf::from("/secrets"), PathBuf::from("/var/lib/certs")]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"subject_filter":"Acme","native":false}"#).unwrap();
        assert_eq!(config.subject_filter.as_deref(), Some("Acme"));
        assert!(!config.native);
        assert!(config.filesystem);
        assert_eq!(config.roots.len(), 2);
    }

    #[test]
    fn password_is_never_serialized() {
        let config = ScanConfig {
            password: Some("hunter2".into()),
            ..ScanConfig::default()
        };
        assert!(!serde_json::to_string(&config).unwrap().contains("hunter2"));
    }
}
