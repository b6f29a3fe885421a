//! Sift CLI
//!
//! Pluggable full-text indexing for personal data collections.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use sift_cli::{Cli, commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    commands::run(cli).await
}
