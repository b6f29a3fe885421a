//! Query dispatch to the active engine.

use std::sync::Arc;

use sift_core::Result;

use crate::registry::EngineRegistry;
use crate::types::QueryResults;

/// Forwards queries to whichever engine is active at call time.
///
/// Queries are not queued; concurrent queries run concurrently.
#[derive(Debug, Clone)]
pub struct QueryDispatcher {
    registry: Arc<EngineRegistry>,
}

impl QueryDispatcher {
    /// A dispatcher reading from `registry`.
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    /// Query documents of one type.
    pub async fn query_type(&self, doc_type: &str, query: &str) -> Result<QueryResults> {
        log::debug!("query_type type={doc_type} q={query:?}");
        self.registry.current().query_type(doc_type, query).await
    }

    /// Query documents of every type.
    pub async fn query_all(&self, query: &str) -> Result<QueryResults> {
        log::debug!("query_all q={query:?}");
        self.registry.current().query_all(query).await
    }

    /// Query one type, or all types when `doc_type` is `None` or empty.
    pub async fn query(&self, doc_type: Option<&str>, query: &str) -> Result<QueryResults> {
        match doc_type.filter(|t| !t.is_empty()) {
            Some(doc_type) => self.query_type(doc_type, query).await,
            None => self.query_all(query).await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Error;

    #[tokio::test]
    async fn test_dispatch_to_null_engine() {
        let dispatcher = QueryDispatcher::new(Arc::new(EngineRegistry::new()));
        let err = dispatcher.query_all("anything").await.unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { .. }));

        let err = dispatcher.query(Some(""), "anything").await.unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { .. }));

        let err = dispatcher.query(Some("photo"), "x").await.unwrap_err();
        assert!(matches!(err, Error::EngineUnavailable { .. }));
    }
}
