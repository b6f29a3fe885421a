//! Log output for the `sift` binary.
//!
//! Library crates log through the `log` facade; the subscriber installed
//! here also receives those records. Output goes to stderr so command
//! results on stdout stay machine-readable.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "info,sift=debug" } else { "info" }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// Tests
// ============================================================================
