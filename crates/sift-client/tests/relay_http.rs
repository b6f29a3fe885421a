//! Relay behavior against a local provider.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::json;
use sift_client::{Error, ProviderRegistry, QueryRelay, SearchProvider};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serve `router` on an ephemeral loopback port and return its base URI.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

fn relay_for(uri: &str) -> QueryRelay {
    let mut providers = ProviderRegistry::new();
    providers.push(SearchProvider::new("local", uri).unwrap());
    QueryRelay::new(providers).unwrap()
}

#[tokio::test]
async fn relays_hits_and_query_parameters() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/query",
            get(
                |State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>| async move {
                    seen.lock().unwrap().push(params);
                    axum::Json(json!([{"_id": "c1", "_type": "contact", "score": 1.0}]))
                },
            ),
        )
        .with_state(Arc::clone(&seen));
    let relay = relay_for(&spawn(router).await);

    let response = relay
        .search(Some("contact"), "ann lee", Some(10), Some(5))
        .await
        .unwrap();
    assert_eq!(response.hits.hits, json!([{"_id": "c1", "_type": "contact", "score": 1.0}]));
    assert_eq!(response.hits.total, None);

    relay.search(Some(""), "bob", None, None).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].get("q").map(String::as_str), Some("ann lee"));
    assert_eq!(seen[0].get("type").map(String::as_str), Some("contact"));
    assert!(!seen[0].contains_key("offset"));
    assert_eq!(seen[1].get("q").map(String::as_str), Some("bob"));
    assert!(!seen[1].contains_key("type"));
}

#[tokio::test]
async fn error_status_is_provider_failure() {
    let router = Router::new().route(
        "/query",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let relay = relay_for(&spawn(router).await);
    let err = relay.search(None, "x", None, None).await.unwrap_err();
    assert!(matches!(err, Error::ProviderRequestFailed { .. }));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn empty_body_is_provider_failure() {
    let router = Router::new().route("/query", get(|| async { "" }));
    let relay = relay_for(&spawn(router).await);
    let err = relay.search(None, "x", None, None).await.unwrap_err();
    assert!(matches!(err, Error::ProviderRequestFailed { .. }));
}

#[tokio::test]
async fn non_json_body_is_provider_failure() {
    let router = Router::new().route("/query", get(|| async { "<html>nope</html>" }));
    let relay = relay_for(&spawn(router).await);
    let err = relay.search(None, "x", None, None).await.unwrap_err();
    assert!(matches!(err, Error::ProviderRequestFailed { .. }));
}
