//! Managed-runtime (JDK) installation and bundled CA store lookup.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Launcher binary searched for on `PATH`.
pub const LAUNCHER: &str = if cfg!(windows) { "java.exe" } else { "java" };

/// Bundled CA store locations relative to the runtime home, older layout
/// first.
pub const CA_BUNDLE_CANDIDATES: &[&[&str]] = &[
    // JDK 8 and earlier
    &["jre", "lib", "security", "cacerts"],
    // JDK 9+
    &["lib", "security", "cacerts"],
];

/// Locates the runtime installation from a configured home or the search path.
#[derive(Debug, Clone, Default)]
pub struct RuntimeLocator {
    home: Option<PathBuf>,
    search_path: Option<OsString>,
}

impl RuntimeLocator {
    /// Build a locator from explicit inputs.
    #[must_use]
    pub const fn new(home: Option<PathBuf>, search_path: Option<OsString>) -> Self {
        Self { home, search_path }
    }

    /// Build a locator from `JAVA_HOME` and `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        let home = std::env::var_os("JAVA_HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from);
        Self::new(home, std::env::var_os("PATH"))
    }

    /// Override the configured home.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        if home.is_some() {
            self.home = home;
        }
        self
    }

    /// Resolve the runtime installation root.
    ///
    /// A configured home wins if it exists; otherwise the launcher is looked
    /// up on the search path, symlinks are resolved, and its grandparent
    /// (`<home>/bin/java`) is returned.
    pub fn resolve_runtime_home(&self) -> Option<PathBuf> {
        if let Some(home) = &self.home {
            if home.is_dir() {
                return Some(home.clone());
            }
            debug!(home = %home.display(), "configured runtime home does not exist");
        }

        let launcher = self.which(LAUNCHER)?;
        let real = std::fs::canonicalize(&launcher)
            .map_err(|e| debug!(path = %launcher.display(), error = %e, "cannot resolve launcher"))
            .ok()?;
        real.parent()
            .and_then(Path::parent)
            .filter(|home| home.is_dir())
            .map(Path::to_path_buf)
    }

    /// Resolve the runtime's bundled CA store file.
    pub fn resolve_bundled_ca_bundle(&self) -> Option<PathBuf> {
        let home = self.resolve_runtime_home()?;
        bundled_ca_bundle(&home)
    }

    /// First `name` on the search path that is a regular file.
    fn which(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

/// First existing CA store under `home`, probing [`CA_BUNDLE_CANDIDATES`].
pub fn bundled_ca_bundle(home: &Path) -> Option<PathBuf> {
    CA_BUNDLE_CANDIDATES
        .iter()
        .map(|parts| parts.iter().fold(home.to_path_buf(), |p, part| p.join(part)))
        .find(|candidate| candidate.is_file())
}
