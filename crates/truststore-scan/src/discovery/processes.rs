//! Trust-store configuration of running runtime processes, read from `/proc`.

use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;
use crate::types::{ProcessRecord, ProcessTrustConfig};

/// Substring identifying a runtime process by its command.
pub const RUNTIME_SIGNATURE: &str = "java";

/// Flag naming the process's trust store.
pub const TRUST_STORE_FLAG: &str = "-Djavax.net.ssl.trustStore=";

/// Flag carrying the trust store's password.
pub const TRUST_STORE_PASSWORD_FLAG: &str = "-Djavax.net.ssl.trustStorePassword=";

/// Flag carrying the trust store's type.
pub const TRUST_STORE_TYPE_FLAG: &str = "-Djavax.net.ssl.trustStoreType=";

/// Returns true if the record's command carries the runtime signature.
#[must_use]
pub fn is_runtime_process(record: &ProcessRecord) -> bool {
    record
        .command
        .to_lowercase()
        .contains(RUNTIME_SIGNATURE)
}

/// Every running process whose command matches [`RUNTIME_SIGNATURE`].
///
/// Processes whose arguments cannot be read are skipped.
///
/// # Errors
///
/// Returns `ScanError::Procfs` if the process table cannot be enumerated.
pub fn list_candidate_processes() -> Result<Vec<ProcessRecord>> {
    let candidates: Vec<_> = all_process_records()?
        .into_iter()
        .filter(is_runtime_process)
        .collect();
    debug!(count = candidates.len(), "runtime processes found");
    Ok(candidates)
}

/// Trust-store configuration of one process, if it names a trust store.
#[must_use]
pub fn extract_trust_config(record: &ProcessRecord) -> Option<ProcessTrustConfig> {
    parse_trust_args(record.pid, &record.args)
}

/// Scan an argument list for the trust-store flags.
///
/// Flags match as trimmed, case-insensitive prefixes and take everything
/// after the first `=` as their value. Without the path flag the result is
/// `None`, whatever else is present.
pub fn parse_trust_args<S: AsRef<str>>(pid: i32, args: &[S]) -> Option<ProcessTrustConfig> {
    let path = flag_value(args, TRUST_STORE_FLAG)?;
    Some(ProcessTrustConfig {
        pid,
        trust_store_path: PathBuf::from(path),
        trust_store_password: flag_value(args, TRUST_STORE_PASSWORD_FLAG).map(str::to_string),
        trust_store_type: flag_value(args, TRUST_STORE_TYPE_FLAG)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    })
}

/// Trust-store configurations of every candidate process.
///
/// # Errors
///
/// Returns `ScanError::Procfs` if the process table cannot be enumerated.
pub fn discover_process_trust_configs() -> Result<Vec<ProcessTrustConfig>> {
    Ok(list_candidate_processes()?
        .iter()
        .filter_map(extract_trust_config)
        .collect())
}

fn flag_value<'a, S: AsRef<str>>(args: &'a [S], flag: &str) -> Option<&'a str> {
    args.iter().map(|a| a.as_ref().trim()).find_map(|arg| {
        let head = arg.get(..flag.len())?;
        if head.eq_ignore_ascii_case(flag) {
            arg.split_once('=').map(|(_, value)| value)
        } else {
            None
        }
    })
}

#[cfg(target_os = "linux")]
fn all_process_records() -> Result<Vec<ProcessRecord>> {
    use crate::error::ScanError;

    let all_procs =
        procfs::process::all_processes().map_err(|e| ScanError::Procfs(e.to_string()))?;

    let mut records = Vec::new();
    for entry in all_procs {
        let proc = match entry {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "skipping inaccessible process");
                continue;
            }
        };
        if let Some(record) = read_record(&proc) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read one process. The exe link is often unreadable for other users'
/// processes, so `argv[0]` and then `comm` stand in for the command.
#[cfg(target_os = "linux")]
fn read_record(proc: &procfs::process::Process) -> Option<ProcessRecord> {
    let pid = proc.pid;
    let cmdline = proc
        .cmdline()
        .map_err(|e| debug!(pid, error = %e, "cannot read process arguments"))
        .ok()?;

    let command = proc
        .exe()
        .ok()
        .map(|p| p.display().to_string())
        .or_else(|| cmdline.first().cloned())
        .or_else(|| proc.stat().ok().map(|s| s.comm))?;

    Some(ProcessRecord {
        pid,
        command,
        args: cmdline.into_iter().skip(1).collect(),
    })
}

#[cfg(not(target_os = "linux"))]
fn all_process_records() -> Result<Vec<ProcessRecord>> {
    debug!("process introspection is only available on Linux");
    Ok(Vec::new())
}
