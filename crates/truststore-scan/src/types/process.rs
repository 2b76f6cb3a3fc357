//! Process information types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A running process as seen by the introspector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID
    pub pid: i32,
    /// Executable path, or `argv[0]` / comm when the exe link is unreadable
    pub command: String,
    /// Startup arguments, excluding `argv[0]`
    pub args: Vec<String>,
}

/// Trust-store configuration recovered from a process's startup arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTrustConfig {
    /// Process ID
    pub pid: i32,
    /// Value of `-Djavax.net.ssl.trustStore=`
    pub trust_store_path: PathBuf,
    /// Value of `-Djavax.net.ssl.trustStorePassword=`, if set
    #[serde(skip_serializing, default)]
    pub trust_store_password: Option<String>,
    /// Value of `-Djavax.net.ssl.trustStoreType=`, if set
    pub trust_store_type: Option<String>,
}
