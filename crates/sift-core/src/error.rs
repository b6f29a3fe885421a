//! Error types for Sift.
//!
//! Every failure that can reach an indexing completion or a query caller is a
//! variant of [`Error`]. Document-level failures (no mapping, no identifier,
//! nothing to index) are distinguishable from engine and relay failures so
//! callers can decide whether to retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur while mapping, indexing, or querying documents.
///
/// The enum is `#[non_exhaustive]` so new engines can add failure kinds
/// without breaking downstream matches.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The document type has no entry in the mapping table.
    #[error("No valid mapping for the type: {doc_type}")]
    MappingNotFound {
        /// The requested document type
        doc_type: String,
    },

    /// The mapping names no `_id` field, or the document's value for it is
    /// absent or empty.
    #[error("No valid id property was found for type: {doc_type}")]
    MissingIdentifier {
        /// The document type being indexed
        doc_type: String,
    },

    /// Flattening produced no tokens.
    #[error("No valid tokens were found to index ({doc_type} {id})")]
    NoTokensFound {
        /// The document type being indexed
        doc_type: String,
        /// The resolved identifier
        id: String,
    },

    /// The active engine cannot index or query (the null engine).
    #[error("Search engine unavailable: {reason}")]
    EngineUnavailable {
        /// Why no working engine is active
        reason: String,
    },

    /// The backend itself failed.
    #[error("Search backend failure: {message}")]
    BackendFailure {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No search provider is configured for relaying queries.
    #[error("No search providers found")]
    NoProviderFound,

    /// The relayed provider call failed.
    #[error("Failed calling provider GET at {url}: {message}")]
    ProviderRequestFailed {
        /// The URL that was requested
        url: String,
        /// What went wrong
        message: String,
    },

    /// An indexing request exceeded the configured per-request timeout.
    #[error("Indexing timed out after {after:?}")]
    Timeout {
        /// The configured limit
        after: Duration,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// A mapping definition is malformed.
    #[error("Invalid mapping: {message}")]
    InvalidMapping {
        /// What is wrong with the mapping
        message: String,
    },

    /// I/O error with the path that caused it.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The indexing queue went away before reporting a result.
    #[error("Indexing queue closed before the request completed")]
    QueueClosed,
}

/// Convenience `Result` type alias for Sift operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether the failure was caused by the submitted document or
    /// mapping rather than by the engine.
    ///
    /// Client errors will fail again if retried unchanged.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MappingNotFound { .. }
                | Error::MissingIdentifier { .. }
                | Error::NoTokensFound { .. }
                | Error::InvalidMapping { .. }
                | Error::Json(_)
        )
    }

    /// Short machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MappingNotFound { .. } => "mapping_not_found",
            Error::MissingIdentifier { .. } => "missing_identifier",
            Error::NoTokensFound { .. } => "no_tokens_found",
            Error::EngineUnavailable { .. } => "engine_unavailable",
            Error::BackendFailure { .. } => "backend_failure",
            Error::NoProviderFound => "no_provider_found",
            Error::ProviderRequestFailed { .. } => "provider_request_failed",
            Error::Timeout { .. } => "timeout",
            Error::Config { .. } => "config",
            Error::InvalidMapping { .. } => "invalid_mapping",
            Error::Io { .. } => "io",
            Error::Json(_) => "json",
            Error::QueueClosed => "queue_closed",
        }
    }

    /// Creates a mapping-not-found error.
    pub fn mapping_not_found<S: Into<String>>(doc_type: S) -> Self {
        Error::MappingNotFound {
            doc_type: doc_type.into(),
        }
    }

    /// Creates a missing-identifier error.
    pub fn missing_identifier<S: Into<String>>(doc_type: S) -> Self {
        Error::MissingIdentifier {
            doc_type: doc_type.into(),
        }
    }

    /// Creates a no-tokens error.
    pub fn no_tokens<T, I>(doc_type: T, id: I) -> Self
    where
        T: Into<String>,
        I: Into<String>,
    {
        Error::NoTokensFound {
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    /// Creates an engine-unavailable error.
    pub fn engine_unavailable<S: Into<String>>(reason: S) -> Self {
        Error::EngineUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a backend failure with a message.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::BackendFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a backend failure with a message and source error.
    pub fn backend_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::BackendFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a provider request failure.
    pub fn provider_request<U, M>(url: U, message: M) -> Self
    where
        U: Into<String>,
        M: Into<String>,
    {
        Error::ProviderRequestFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid-mapping error.
    pub fn invalid_mapping<S: Into<String>>(message: S) -> Self {
        Error::InvalidMapping {
            message: message.into(),
        }
    }

    /// Creates an I/O error carrying the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
