//! `truststore-scan convert` - Rewrite a store as PKCS#12.

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde_json::json;

use truststore_scan::convert::{self, AliasPattern};

use super::{open_store, Context};
use crate::cli::args::ConvertArgs;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context, args: ConvertArgs) -> Result<()> {
    if args.destination.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.destination.display()
        );
    }

    let pattern = args
        .alias
        .as_deref()
        .map(AliasPattern::new)
        .transpose()
        .context("invalid --alias pattern")?;

    let store = open_store(&args.input, &args.store_args)?;
    let store_password = args.store_args.password.as_deref().unwrap_or_default();
    let key_password = args.key_password.as_deref().unwrap_or(store_password);

    let canonical = convert::to_canonical(&store, Some(key_password), pattern.as_ref())
        .with_context(|| format!("cannot convert {}", args.input.display()))?;
    // PKCS#12 has one password for the container and its keys
    convert::write_canonical(&canonical, &args.destination, key_password)?;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&json!({
            "input": args.input,
            "input_format": store.format(),
            "output": args.destination,
            "entries": canonical.len(),
        }))?,
        OutputFormat::Pretty => println!(
            "{} {} ({}) -> {} ({} entries)",
            "Converted".green().bold(),
            args.input.display(),
            store.format(),
            args.destination.display(),
            canonical.len()
        ),
    }

    Ok(())
}
