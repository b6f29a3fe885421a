//! Sift Core: shared errors, configuration, and utilities.
//!
//! This crate provides the foundational types used across all Sift crates.
//! It has no internal Sift dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`config`]: Layered configuration (defaults, TOML file, environment)
//! - [`util`]: Path and URL helpers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use config::{EngineConfig, ProviderConfig, ServerConfig, SiftConfig};
pub use error::{Error, Result};
