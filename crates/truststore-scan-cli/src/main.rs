//! truststore-scan - find and normalize certificate trust stores on a host.

use anyhow::Result;

fn main() -> Result<()> {
    truststore_scan_cli::run()
}
