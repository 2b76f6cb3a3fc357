//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Find, open and normalize certificate trust stores.
///
/// Looks at the OS trust stores, the Java runtime's bundled cacerts, trust
/// stores named on running JVM command lines, and keystore files under a
/// set of directories.
#[derive(Parser, Debug)]
#[command(name = "truststore-scan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Config file (default: the platform config dir)
    #[arg(long, global = true, env = "TRUSTSTORE_SCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the host for trust stores and list their certificates
    Scan(ScanArgs),

    /// Show certificates, trust anchors and keys of one store
    Inspect(InspectArgs),

    /// Convert a store to PKCS#12
    Convert(ConvertArgs),

    /// Find the store entry that issued a CRL
    Crl(CrlArgs),

    /// List the store providers this build can open
    Providers,

    /// Show CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Shared store options
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store password (a no-password retry follows if it is rejected)
    #[arg(short, long, env = "TRUSTSTORE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Store format (jks, pkcs12, p12, pfx); guessed from the file otherwise
    #[arg(short = 't', long = "type")]
    pub format: Option<String>,
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Only report certificates whose subject contains this text (case-insensitive)
    #[arg(long, value_name = "SUBSTRING")]
    pub ca: Option<String>,

    /// Store password (a no-password retry follows if it is rejected)
    #[arg(short, long, env = "TRUSTSTORE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory to search for keystore files (repeatable; replaces the defaults)
    #[arg(short, long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Java home to use instead of JAVA_HOME
    #[arg(long, value_name = "DIR")]
    pub runtime_home: Option<PathBuf>,

    /// Skip the OS trust stores
    #[arg(long)]
    pub no_native: bool,

    /// Skip the runtime's bundled CA store
    #[arg(long)]
    pub no_runtime: bool,

    /// Skip trust stores of running processes
    #[arg(long)]
    pub no_processes: bool,

    /// Skip the filesystem walk
    #[arg(long)]
    pub no_filesystem: bool,

    /// Hide stores that failed to open
    #[arg(long)]
    pub loaded_only: bool,
}

// ============================================================================
// Inspect command
// ============================================================================

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Store file, or a directory of PEM certificates
    pub store: PathBuf,

    #[command(flatten)]
    pub store_args: StoreArgs,

    /// Only show certificates whose subject contains this text (case-insensitive)
    #[arg(long, value_name = "SUBSTRING")]
    pub ca: Option<String>,

    /// Password for key entries (defaults to the store password)
    #[arg(long)]
    pub key_password: Option<String>,
}

// ============================================================================
// Convert command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source store
    pub input: PathBuf,

    /// Destination PKCS#12 file
    #[arg(value_name = "OUTPUT")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub store_args: StoreArgs,

    /// Password for key entries; it opens them and protects the written
    /// PKCS#12 file (defaults to the store password)
    #[arg(long)]
    pub key_password: Option<String>,

    /// Only copy aliases fully matching this regular expression
    #[arg(long, value_name = "REGEX")]
    pub alias: Option<String>,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    pub force: bool,
}

// ============================================================================
// CRL command
// ============================================================================

#[derive(Args, Debug)]
pub struct CrlArgs {
    /// Store holding the candidate issuers
    pub store: PathBuf,

    /// CRL file (PEM or DER)
    pub crl: PathBuf,

    #[command(flatten)]
    pub store_args: StoreArgs,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
}
