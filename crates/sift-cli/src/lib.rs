//! # sift-cli
//!
//! Command-line front end for Sift.
//!
//! - `sift serve`: run the provider endpoint
//! - `sift index <type> <file>`: index documents through the queue
//! - `sift query [--type T] <q>`: query the configured engine
//! - `sift relay [--type T] <term>`: query through the configured provider
//! - `sift mappings`: print the active mapping table
//! - `sift config ...`: inspect and edit the configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod logging;

pub use cli::{Cli, Command, ConfigAction};
