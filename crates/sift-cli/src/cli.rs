//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift: pluggable full-text indexing for personal data collections
#[derive(Parser, Debug)]
#[command(name = "sift", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Engine to use instead of the configured one
    #[arg(short, long, global = true)]
    pub engine: Option<String>,

    /// Enable debug logging for Sift crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP provider endpoint
    Serve {
        /// Address to listen on (overrides `server.bind`)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Index a JSON document, or each element of a JSON array
    Index {
        /// Document type (e.g. `contact`, `status/twitter`)
        doc_type: String,
        /// JSON file to read
        file: PathBuf,
    },

    /// Query the configured engine
    Query {
        /// Restrict to one document type
        #[arg(short = 't', long = "type")]
        doc_type: Option<String>,
        /// Query text
        query: String,
    },

    /// Query through the first configured search provider
    Relay {
        /// Restrict to one document type
        #[arg(short = 't', long = "type")]
        doc_type: Option<String>,
        /// Result offset (not applied by providers)
        #[arg(long)]
        offset: Option<usize>,
        /// Result limit (not applied by providers)
        #[arg(long)]
        limit: Option<usize>,
        /// Search term
        term: String,
    },

    /// Print the active mapping table as JSON
    Mappings,

    /// Inspect and edit the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `sift config` actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key (e.g. `engine.name`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value (bool, integer, float, or string)
        value: String,
    },
    /// Write a default config file
    Init {
        /// Where to write it (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings as environment assignments
    Export {
        /// Format as `--env KEY=VALUE` for container runtimes
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
