//! `truststore-scan scan` - Discover every trust store on the host.

use anyhow::Result;
use colored::Colorize;

use truststore_scan::{collect_report, ScanConfig, ScanReport, StoreReport};

use super::Context;
use crate::cli::args::ScanArgs;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context, args: ScanArgs) -> Result<()> {
    let config = effective_config(ctx.config.scan.clone(), &args);
    let mut report = collect_report(&config);
    if args.loaded_only {
        report.stores.retain(|s| s.loaded);
    }

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&report)?,
        OutputFormat::Pretty => print_report(&report),
    }

    Ok(())
}

/// Layer command-line flags over the configured scan defaults.
fn effective_config(mut config: ScanConfig, args: &ScanArgs) -> ScanConfig {
    if !args.roots.is_empty() {
        config.roots.clone_from(&args.roots);
    }
    if args.ca.is_some() {
        config.subject_filter.clone_from(&args.ca);
    }
    if args.password.is_some() {
        config.password.clone_from(&args.password);
    }
    if args.runtime_home.is_some() {
        config.runtime_home.clone_from(&args.runtime_home);
    }
    config.native &= !args.no_native;
    config.runtime &= !args.no_runtime;
    config.processes &= !args.no_processes;
    config.filesystem &= !args.no_filesystem;
    config
}

fn print_report(report: &ScanReport) {
    if let Some(home) = &report.runtime_home {
        println!("{} {}", "Runtime home:".bold(), home.display());
    }
    if let Some(filter) = &report.subject_filter {
        println!("{} {}", "Subject filter:".bold(), filter.cyan());
    }
    println!();

    for store in &report.stores {
        print_store(store);
    }

    let s = &report.summary;
    println!(
        "{} {} stores ({} loaded, {} failed), {} certificates, {} expired",
        "Summary:".bold(),
        s.total_stores,
        s.loaded_stores.to_string().green(),
        s.failed_stores.to_string().red(),
        s.total_certificates.to_string().cyan(),
        s.expired_certificates.to_string().yellow()
    );
}

fn print_store(store: &StoreReport) {
    let status = if store.loaded {
        "loaded".green()
    } else {
        "failed".red()
    };
    let format = store.format.map(|f| f.to_string()).unwrap_or_default();
    println!(
        "{} {} {} {}",
        format!("[{:?}]", store.source).dimmed(),
        store.location.to_string().bold(),
        status,
        format.cyan()
    );
    if let (Some(path), truststore_scan::StoreLocation::Process(_)) = (&store.path, &store.location) {
        println!("    {} {}", "store:".dimmed(), path.display());
    }
    for cert in &store.certificates {
        output::print_certificate(cert);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ScanArgs {
        ScanArgs {
            ca: None,
            password: None,
            roots: Vec::new(),
            runtime_home: None,
            no_native: false,
            no_runtime: false,
            no_processes: false,
            no_filesystem: false,
            loaded_only: false,
        }
    }

    #[test]
    fn flags_override_config() {
        let base = ScanConfig {
            subject_filter: Some("from-config".into()),
            ..ScanConfig::default()
        };
        let cli = ScanArgs {
            ca: Some("Acme".into()),
            roots: vec![PathBuf::from("/opt/tls")],
            no_processes: true,
            ..args()
        };
        let merged = effective_config(base, &cli);
        assert_eq!(merged.subject_filter.as_deref(), Some("Acme"));
        assert_eq!(merged.roots, vec![PathBuf::from("/opt/tls")]);
        assert!(!merged.processes);
        assert!(merged.native);
    }

    #[test]
    fn config_disabled_source_stays_disabled() {
        let base = ScanConfig {
            native: false,
            ..ScanConfig::default()
        };
        let merged = effective_config(base, &args());
        assert!(!merged.native);
        assert_eq!(merged.roots.len(), 2);
    }
}
