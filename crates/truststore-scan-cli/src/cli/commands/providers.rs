//! `truststore-scan providers` - Store providers available in this build.

use anyhow::Result;
use colored::Colorize;

use truststore_scan::registry;

use super::Context;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context) -> Result<()> {
    // Directory stores are always openable from the CLI.
    registry::register_directory_provider();
    let providers = registry::providers();

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&providers)?,
        OutputFormat::Pretty => {
            println!("{}", "Store providers:".bold());
            for name in &providers {
                println!("  {}", name.cyan());
            }
        }
    }

    Ok(())
}
