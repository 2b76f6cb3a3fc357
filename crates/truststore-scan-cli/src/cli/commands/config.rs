//! `truststore-scan config` - Show CLI configuration.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::{self, OutputFormat};

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Path => show_path(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => output::print_json(config)?,
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();

            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );

            let scan = &config.scan;
            let roots: Vec<_> = scan.roots.iter().map(|r| r.display().to_string()).collect();
            println!("  {} {}", "scan.roots:".bold(), roots.join(", "));
            println!(
                "  {} {}",
                "scan.subject_filter:".bold(),
                scan.subject_filter
                    .clone()
                    .unwrap_or_else(|| "(not set)".dimmed().to_string())
            );
            let password = if scan.password.is_some() {
                "****".to_string()
            } else {
                "(not set)".dimmed().to_string()
            };
            println!("  {} {}", "scan.password:".bold(), password);
            println!("  {} {}", "scan.native:".bold(), scan.native);
            println!("  {} {}", "scan.runtime:".bold(), scan.runtime);
            println!("  {} {}", "scan.processes:".bold(), scan.processes);
            println!("  {} {}", "scan.filesystem:".bold(), scan.filesystem);
        }
    }

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = match &ctx.config_path {
        Some(p) => p.clone(),
        None => Config::path()?,
    };
    println!("{}", path.display());
    Ok(())
}
