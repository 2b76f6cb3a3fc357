//! Directory-aggregated trust store: one PEM file, one trust anchor.

use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::types::{LoadedStore, StoreEntry, StoreFormat, StoredCertificate};

/// Load every PEM certificate file directly inside `dir`.
///
/// The first `CERTIFICATE` block of each regular file becomes a trusted
/// entry aliased by the file name. Files without one, or whose block does
/// not parse as X.509, are skipped.
pub fn load_directory(dir: &Path) -> Result<LoadedStore, LoadError> {
    let meta = std::fs::metadata(dir).map_err(|e| LoadError::io(dir, e))?;
    if !meta.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut store = LoadedStore::new(StoreFormat::Directory);
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                return Err(LoadError::io(dir, source));
            }
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match first_certificate(path) {
            Some(der) => {
                let alias = entry.file_name().to_string_lossy().into_owned();
                store.insert(alias, StoreEntry::TrustedCertificate(StoredCertificate::x509(der)));
            }
            None => debug!(path = %path.display(), "no PEM certificate in file, skipping"),
        }
    }

    Ok(store)
}

fn first_certificate(path: &Path) -> Option<Vec<u8>> {
    let content = std::fs::read(path)
        .map_err(|e| debug!(path = %path.display(), error = %e, "cannot read file"))
        .ok()?;
    let pems = pem::parse_many(&content).ok()?;
    pems.into_iter()
        .find(|p| p.tag() == "CERTIFICATE")
        .map(pem::Pem::into_contents)
        .filter(|der| x509_parser::parse_x509_certificate(der).is_ok())
}
