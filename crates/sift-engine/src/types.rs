//! Result types shared by every engine.
//!
//! These types are always available regardless of feature flags, and they
//! double as the JSON wire shapes of the provider endpoint.

use serde::{Deserialize, Serialize};

/// Outcome of a successful indexing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReceipt {
    /// Identifier the document was stored under.
    pub id: String,

    /// Document type.
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Time the engine spent on the request, in milliseconds.
    pub took_ms: u64,

    /// Number of existing documents the new one replaced.
    pub replaced: u64,
}

/// A single query hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Stored document identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Stored document type.
    #[serde(rename = "_type")]
    pub doc_type: String,

    /// Relevance score (higher is better).
    pub score: f32,

    /// Stored token content, when the engine keeps it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
}

/// Hits for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    /// Hits ordered by relevance, highest first.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents (may be > hits.len() if limited).
    pub total: usize,

    /// Engine that executed the query.
    pub engine: String,

    /// Time the engine spent, in milliseconds.
    pub took_ms: u64,
}

impl QueryResults {
    /// Create empty results.
    pub fn empty(engine: &str) -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            engine: engine.to_string(),
            took_ms: 0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
