//! `truststore-scan inspect` - Contents of a single store.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use truststore_scan::{
    extract, registry, CertificateEntry, EntryKind, LoadedStore, StoreFormat, TrustStoreVariant,
};

use super::{open_store, Context};
use crate::cli::args::InspectArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct AliasSummary<'a> {
    alias: &'a str,
    kind: EntryKind,
}

#[derive(Debug, Serialize)]
struct KeySummary {
    alias: String,
    chain_len: usize,
}

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    format: StoreFormat,
    aliases: Vec<AliasSummary<'a>>,
    certificates: Vec<CertificateEntry>,
    trust_anchors: Vec<String>,
    keys: Vec<KeySummary>,
}

pub fn execute(ctx: &Context, args: InspectArgs) -> Result<()> {
    let store = if args.store.is_dir() {
        registry::instantiate(&TrustStoreVariant::Directory(args.store.clone()))?
    } else {
        open_store(&args.store, &args.store_args)?
    };

    let key_password = args
        .key_password
        .as_deref()
        .or(args.store_args.password.as_deref())
        .unwrap_or_default();
    let inspection = inspect(&store, args.ca.as_deref(), key_password);

    match ctx.output_format {
        OutputFormat::Json => output::print_json(&inspection)?,
        OutputFormat::Pretty => print_inspection(&inspection),
    }

    Ok(())
}

fn inspect<'a>(store: &'a LoadedStore, ca: Option<&str>, key_password: &str) -> Inspection<'a> {
    Inspection {
        format: store.format(),
        aliases: store
            .entries()
            .map(|(alias, entry)| AliasSummary {
                alias,
                kind: entry.kind(),
            })
            .collect(),
        certificates: extract::filter_by_subject(extract::certificates(store), ca),
        trust_anchors: extract::trust_anchors(store)
            .into_iter()
            .map(|a| a.fingerprint)
            .collect(),
        keys: extract::keys(store, key_password)
            .into_iter()
            .map(|k| KeySummary {
                alias: k.alias,
                chain_len: k.chain_len,
            })
            .collect(),
    }
}

fn print_inspection(inspection: &Inspection<'_>) {
    println!(
        "{} {} ({} aliases, {} trust anchors)",
        "Format:".bold(),
        inspection.format.to_string().cyan(),
        inspection.aliases.len(),
        inspection.trust_anchors.len()
    );
    println!();

    println!("{}", "Certificates:".bold());
    if inspection.certificates.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for cert in &inspection.certificates {
        output::print_certificate(cert);
    }

    let locked = inspection
        .aliases
        .iter()
        .filter(|a| a.kind.is_key())
        .count()
        - inspection.keys.len();
    if !inspection.keys.is_empty() || locked > 0 {
        println!();
        println!("{}", "Keys:".bold());
        for key in &inspection.keys {
            println!("    {} (chain of {})", key.alias.green(), key.chain_len);
        }
        if locked > 0 {
            println!("    {}", format!("{locked} key(s) did not open with the key password").yellow());
        }
    }
}
