//! Output formatting.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use truststore_scan::CertificateEntry;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one certificate as an indented block.
pub fn print_certificate(cert: &CertificateEntry) {
    let validity = if cert.expired {
        format!("expired {}", cert.not_after.format("%Y-%m-%d")).red().to_string()
    } else {
        format!("valid until {}", cert.not_after.format("%Y-%m-%d"))
            .green()
            .to_string()
    };
    println!("    {} {}", cert.subject.bold(), format!("[{}]", cert.alias).dimmed());
    println!("      {} {}", "issuer:".dimmed(), cert.issuer);
    println!("      {} {}", "serial:".dimmed(), cert.serial);
    println!("      {} {}", "sha256:".dimmed(), cert.fingerprint);
    println!("      {validity}");
}
