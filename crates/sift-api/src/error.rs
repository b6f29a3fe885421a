//! Error types for sift-api.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for sift-api operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the endpoint.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from sift-core.
    #[error("Core error: {0}")]
    Core(#[from] sift_core::Error),

    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A request failure rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub sift_core::Error);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        use sift_core::Error as E;
        match &self.0 {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            E::EngineUnavailable { .. } | E::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            E::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            E::BackendFailure { .. } | E::NoProviderFound | E::ProviderRequestFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sift_core::Error> for ApiError {
    fn from(error: sift_core::Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Request failed: {}", self.0);
        }
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
