//! Sift pluggable full-text indexing, umbrella crate.
//!
//! This crate re-exports all Sift components for convenience.
//! Use feature flags to enable specific functionality.

#![doc = include_str!("../README.md")]

pub use sift_core as core;
pub use sift_engine as engine;
pub use sift_mapping as mapping;

#[cfg(feature = "client")]
pub use sift_client as client;

#[cfg(feature = "api")]
pub use sift_api as api;

pub use sift_core::{Error, Result, SiftConfig};
pub use sift_engine::Search;
pub use sift_mapping::MappingTable;
