//! `truststore-scan crl` - Match CRLs to the store entries that issued them.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use truststore_scan::crl;

use super::{open_store, Context};
use crate::cli::args::CrlArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct CrlMatch {
    /// Position of the CRL in the file
    index: usize,
    /// Alias of the verifying issuer, if any
    issuer_alias: Option<String>,
}

pub fn execute(ctx: &Context, args: CrlArgs) -> Result<()> {
    let store = open_store(&args.store, &args.store_args)?;
    let matches: Vec<CrlMatch> = crl::load_crls(&args.crl)?
        .iter()
        .enumerate()
        .map(|(index, der)| CrlMatch {
            index,
            issuer_alias: crl::verify_der(&store, der),
        })
        .collect();

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&matches)?,
        OutputFormat::Pretty => {
            for m in &matches {
                match &m.issuer_alias {
                    Some(alias) => println!(
                        "CRL #{}: {} by {}",
                        m.index,
                        "signed".green(),
                        alias.bold()
                    ),
                    None => println!(
                        "CRL #{}: {}",
                        m.index,
                        "no issuer in store verifies this CRL".red()
                    ),
                }
            }
        }
    }

    Ok(())
}
