//! Path helpers shared by configuration and the embedded engine.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Expand `~` and `$VAR` references in a path string.
///
/// Unknown variables leave the input untouched rather than failing, so a
/// literal `$` in a directory name still resolves to something usable.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::debug!("Could not expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}

/// Create `path` and any missing parents. Existing directories are left
/// alone.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    log::info!("Creating directory {}", path.display());
    std::fs::create_dir_all(path).map_err(|e| Error::io_with_path(e, path))
}

/// Default on-disk location for the embedded index.
///
/// Uses the platform data directory when one exists, otherwise a
/// `sift-index` directory relative to the working directory.
pub fn default_index_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("sift").join("index"))
        .unwrap_or_else(|| PathBuf::from("sift-index"))
}
