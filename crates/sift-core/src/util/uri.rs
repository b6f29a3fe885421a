//! Provider base URLs.

use url::Url;

use crate::error::{Error, Result};

/// Parse a provider `uri` into a base URL whose path ends with `/`.
///
/// Relative joins (`query`, `index`) then land under the configured path
/// instead of replacing its last segment.
///
/// # Errors
///
/// Returns a config error if `uri` is not an absolute URL.
pub fn base_url(uri: &str) -> Result<Url> {
    let mut url =
        Url::parse(uri).map_err(|e| Error::config(format!("Invalid provider URI {uri:?}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
