//! The index engine trait and the null engine.
//!
//! This module defines the `IndexEngine` trait that every engine must
//! satisfy, plus [`NullEngine`], the fallback installed whenever no working
//! engine could be built.
//!
//! # Engines
//!
//! - `TantivyEngine`: embedded full-text index (requires `engine-tantivy`)
//! - `RemoteEngine`: forwards to a provider over HTTP (requires `engine-remote`)
//! - `NullEngine`: fails every request with `EngineUnavailable`
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_engine::{IndexEngine, NullEngine};
//!
//! let engine = NullEngine::new();
//! let err = engine.query_all("anything").await.unwrap_err();
//! assert_eq!(err.kind(), "engine_unavailable");
//! ```

use async_trait::async_trait;
use serde_json::Value;
use sift_core::{Error, Result};
use sift_mapping::{MappingTable, PreparedDocument};

use crate::types::{IndexReceipt, QueryResults};

/// Abstract index engine.
///
/// Implementations store prepared documents and answer text queries.
/// Mapping resolution is shared: [`index_type`](IndexEngine::index_type)
/// resolves the document through [`mappings`](IndexEngine::mappings) and
/// hands the result to [`index_prepared`](IndexEngine::index_prepared), so
/// every engine honors the mapping table identically.
#[async_trait]
pub trait IndexEngine: Send + Sync {
    /// Engine identifier for diagnostics.
    fn name(&self) -> &str;

    /// Whether the engine can serve requests at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Mapping table used to resolve raw documents.
    fn mappings(&self) -> &MappingTable;

    /// Resolve `document` through the mapping for `doc_type` and index it.
    ///
    /// # Errors
    ///
    /// `MappingNotFound`, `MissingIdentifier` or `NoTokensFound` for
    /// documents that cannot be resolved, otherwise whatever
    /// [`index_prepared`](IndexEngine::index_prepared) reports.
    async fn index_type(&self, doc_type: &str, document: &Value) -> Result<IndexReceipt> {
        let prepared = self.mappings().prepare(doc_type, document)?;
        self.index_prepared(prepared).await
    }

    /// Store an already-resolved document, replacing any with the same key.
    async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt>;

    /// Query documents of one type.
    async fn query_type(&self, doc_type: &str, query: &str) -> Result<QueryResults>;

    /// Query documents of every type.
    async fn query_all(&self, query: &str) -> Result<QueryResults>;
}

/// Engine that cannot index or query.
///
/// Installed at startup and whenever engine construction fails, so the
/// registry always has an engine to hand out.
pub struct NullEngine {
    reason: String,
    mappings: MappingTable,
}

impl NullEngine {
    /// Name reported by [`IndexEngine::name`].
    pub const NAME: &'static str = "null";

    /// A null engine with the default reason.
    pub fn new() -> Self {
        Self::with_reason("Null engine")
    }

    /// A null engine explaining why no real engine is active.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            mappings: MappingTable::new(),
        }
    }

    /// Why this engine is active.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn unavailable(&self) -> Error {
        Error::engine_unavailable(self.reason.clone())
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexEngine for NullEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        false
    }

    fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    async fn index_type(&self, _doc_type: &str, _document: &Value) -> Result<IndexReceipt> {
        Err(self.unavailable())
    }

    async fn index_prepared(&self, _document: PreparedDocument) -> Result<IndexReceipt> {
        Err(self.unavailable())
    }

    async fn query_type(&self, _doc_type: &str, _query: &str) -> Result<QueryResults> {
        Err(self.unavailable())
    }

    async fn query_all(&self, _query: &str) -> Result<QueryResults> {
        Err(self.unavailable())
    }
}

impl std::fmt::Debug for NullEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullEngine")
            .field("reason", &self.reason)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
