//! Keystore files under filesystem roots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::loader;
use crate::types::{LoadedStore, StoreFormat};

/// File extensions (lowercase) that mark a probable keystore.
pub const KEYSTORE_EXTENSIONS: &[&str] = &["jks", "p12", "pfx"];

/// Roots scanned when none are configured.
pub const DEFAULT_SCAN_ROOTS: &[&str] = &["/secrets", "/var/lib/certs"];

/// Returns true if `path` carries a keystore extension, ignoring case.
#[must_use]
pub fn is_keystore_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            KEYSTORE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Walk every root and try to open each keystore candidate.
///
/// Missing roots and unreadable directory entries are skipped. A candidate
/// that opens in none of its formats maps to `None`.
pub fn scan<P: AsRef<Path>>(
    roots: &[P],
    password: Option<&str>,
) -> BTreeMap<PathBuf, Option<LoadedStore>> {
    let mut found = BTreeMap::new();
    for root in roots {
        let root = root.as_ref();
        if !root.exists() {
            debug!(root = %root.display(), "scan root not found, skipping");
            continue;
        }

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_keystore_candidate(path) {
                continue;
            }
            if found.contains_key(path) {
                continue;
            }
            let formats = StoreFormat::candidates_for(path);
            let store = loader::try_load_any(path, &formats, password);
            if store.is_none() {
                debug!(path = %path.display(), "keystore candidate did not open");
            }
            found.insert(path.to_path_buf(), store);
        }
    }

    info!(
        candidates = found.len(),
        loaded = found.values().filter(|s| s.is_some()).count(),
        "filesystem scan complete"
    );
    found
}
