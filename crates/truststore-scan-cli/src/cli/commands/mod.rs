//! Command implementations.

pub mod config;
pub mod convert;
pub mod crl;
pub mod inspect;
pub mod providers;
pub mod scan;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use truststore_scan::{loader, LoadedStore, StoreFormat};

use crate::cli::args::StoreArgs;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Loaded configuration
    pub config: Config,

    /// Config file given on the command line
    pub config_path: Option<PathBuf>,
}

/// Open the one store a command was pointed at.
///
/// The declared format wins; otherwise the formats plausible for the file
/// name are tried in turn. Unlike discovery, failure here is an error, and
/// it reports the first format's reason.
pub fn open_store(path: &Path, args: &StoreArgs) -> Result<LoadedStore> {
    let formats = match args.format.as_deref() {
        Some(name) => vec![name.parse::<StoreFormat>()?],
        None => StoreFormat::candidates_for(path),
    };

    let mut first_error = None;
    for format in formats {
        let outcome = loader::try_load_detailed(path, format, args.password.as_deref());
        if let Some(store) = outcome.store {
            if outcome.used_fallback {
                warn!(
                    path = %path.display(),
                    "supplied password was rejected; store opened without a password"
                );
            }
            return Ok(store);
        }
        if first_error.is_none() {
            first_error = outcome.first_error.or(outcome.fallback_error);
        }
    }

    match first_error {
        Some(e) => Err(e).with_context(|| format!("cannot open {}", path.display())),
        None => anyhow::bail!("cannot open {}", path.display()),
    }
}
