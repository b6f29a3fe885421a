//! Route handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_engine::{IndexReceipt, QueueState, Search, SearchHit};
use sift_mapping::PreparedDocument;

use crate::error::ApiError;

/// Query string of `GET /query`.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Query text.
    pub q: String,
    /// Optional document type; empty means all types.
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    /// Active engine name.
    pub engine: String,
    /// Whether the engine can serve requests.
    pub available: bool,
    /// `idle` or `draining`.
    pub queue: String,
    /// Requests waiting in the indexing queue.
    pub pending: usize,
}

/// Build the endpoint router over `search`.
pub fn router(search: Arc<Search>) -> Router {
    Router::new()
        .route("/query", get(query))
        .route("/index", post(index_prepared))
        .route("/index/{*doc_type}", post(index_document))
        .route("/health", get(health))
        .with_state(search)
}

async fn query(
    State(search): State<Arc<Search>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let results = search.query(params.doc_type.as_deref(), &params.q).await?;
    Ok(Json(results.hits))
}

async fn index_document(
    State(search): State<Arc<Search>>,
    Path(doc_type): Path<String>,
    Json(document): Json<Value>,
) -> Result<Json<IndexReceipt>, ApiError> {
    let receipt = search.index(&doc_type, document).await?;
    Ok(Json(receipt))
}

async fn index_prepared(
    State(search): State<Arc<Search>>,
    Json(document): Json<PreparedDocument>,
) -> Result<Json<IndexReceipt>, ApiError> {
    let receipt = search.index_prepared(document).await?;
    Ok(Json(receipt))
}

async fn health(State(search): State<Arc<Search>>) -> Json<Health> {
    let queue = match search.queue_state() {
        QueueState::Idle => "idle",
        QueueState::Draining => "draining",
    };
    Json(Health {
        engine: search.engine_name(),
        available: search.is_available(),
        queue: queue.to_string(),
        pending: search.queue().pending(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use sift_core::EngineConfig;
    use sift_engine::{IndexEngine, TantivyEngine};
    use sift_mapping::MappingTable;
    use tower::ServiceExt;

    fn null_search() -> Arc<Search> {
        Arc::new(Search::new(EngineConfig::default(), MappingTable::builtin()))
    }

    fn tantivy_search() -> Arc<Search> {
        let search = Search::new(EngineConfig::default(), MappingTable::builtin());
        let mappings = search.mappings_handle();
        search.set_engine(|| {
            Ok(Arc::new(TantivyEngine::in_memory(mappings, &EngineConfig::default())?)
                as Arc<dyn IndexEngine>)
        });
        Arc::new(search)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_null_engine() {
        let (status, body) = send(
            router(null_search()),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engine"], "null");
        assert_eq!(body["available"], false);
        assert_eq!(body["queue"], "idle");
    }

    #[tokio::test]
    async fn test_query_null_engine_is_503() {
        let (status, body) = send(
            router(null_search()),
            Request::get("/query?q=ann").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "engine_unavailable");
    }

    #[tokio::test]
    async fn test_index_then_query() {
        let search = tantivy_search();

        let (status, body) = send(
            router(Arc::clone(&search)),
            post_json(
                "/index/status/twitter",
                serde_json::json!({"id": 7, "text": "hello world", "user": {"name": "Ann"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "7");
        assert_eq!(body["type"], "status/twitter");

        let (status, body) = send(
            router(Arc::clone(&search)),
            Request::get("/query?q=hello&type=status%2Ftwitter")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["_id"], "7");
        assert_eq!(body[0]["_type"], "status/twitter");

        let (status, body) = send(
            router(search),
            Request::get("/query?q=hello&type=photo")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_index_prepared() {
        let search = tantivy_search();
        let (status, body) = send(
            router(Arc::clone(&search)),
            post_json(
                "/index",
                serde_json::json!({"doc_type": "note", "id": "n1", "tokens": ["groceries"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "n1");

        let results = search.query_type("note", "groceries").await.unwrap();
        assert_eq!(results.total, 1);
    }

    #[tokio::test]
    async fn test_document_errors_are_400() {
        let search = tantivy_search();

        let (status, body) = send(
            router(Arc::clone(&search)),
            post_json("/index/unknown", serde_json::json!({"id": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "mapping_not_found");

        let (status, body) = send(
            router(search),
            post_json("/index/photo", serde_json::json!({"id": "p2", "caption": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "no_tokens_found");
    }
}
