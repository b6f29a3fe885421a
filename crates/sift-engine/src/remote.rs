//! Engine that forwards to a Sift provider endpoint over HTTP.
//!
//! Documents are resolved locally and the prepared form is posted to
//! `<uri>/index`; queries go to `<uri>/query?q=<q>[&type=<type>]`, which
//! answers with a JSON array of hits.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sift_core::util::uri::base_url;
use sift_core::{Error, Result};
use sift_mapping::{MappingTable, PreparedDocument};

use crate::backend::IndexEngine;
use crate::types::{IndexReceipt, QueryResults, SearchHit};

/// Error body returned by the provider endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    kind: Option<String>,
}

/// HTTP-backed index engine.
pub struct RemoteEngine {
    client: Client,
    base: Url,
    mappings: Arc<MappingTable>,
}

impl RemoteEngine {
    /// Name reported by [`IndexEngine::name`].
    pub const NAME: &'static str = "remote";

    /// An engine talking to the provider at `provider_uri`.
    pub fn new(provider_uri: &str, mappings: Arc<MappingTable>) -> Result<Self> {
        let base = base_url(provider_uri)?;
        let client = Client::builder()
            .build()
            .map_err(|e| Error::backend_with_source("Failed to build HTTP client", e))?;
        log::info!("Remote search engine using provider {base}");
        Ok(Self {
            client,
            base,
            mappings,
        })
    }

    /// Provider base URL (always ends with `/`).
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::config(format!("Invalid provider URL {}{path}: {e}", self.base)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::backend_with_source(format!("Request to {url} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody {
                    error,
                    kind: Some(kind),
                }) if kind == "engine_unavailable" => Error::engine_unavailable(error),
                Ok(ErrorBody { error, .. }) => {
                    Error::backend(format!("{url} returned {status}: {error}"))
                }
                Err(_) => Error::backend(format!("{url} returned {status}: {body}")),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::backend_with_source(format!("Invalid response from {url}"), e))
    }

    async fn search(&self, doc_type: Option<&str>, query: &str) -> Result<QueryResults> {
        let mut url = self.endpoint("query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(doc_type) = doc_type {
                pairs.append_pair("type", doc_type);
            }
        }

        let started = Instant::now();
        let hits: Vec<SearchHit> = self.send(self.client.get(url.clone()), &url).await?;
        Ok(QueryResults {
            total: hits.len(),
            hits,
            engine: Self::NAME.to_string(),
            took_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

#[async_trait]
impl IndexEngine for RemoteEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt> {
        let url = self.endpoint("index")?;
        self.send(self.client.post(url.clone()).json(&document), &url)
            .await
    }

    async fn query_type(&self, doc_type: &str, query: &str) -> Result<QueryResults> {
        self.search(Some(doc_type), query).await
    }

    async fn query_all(&self, query: &str) -> Result<QueryResults> {
        self.search(None, query).await
    }
}

impl std::fmt::Debug for RemoteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEngine")
            .field("base", &self.base.as_str())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_gets_trailing_slash() {
        let engine =
            RemoteEngine::new("http://localhost:8042/search", Arc::new(MappingTable::new())).unwrap();
        assert_eq!(engine.base().as_str(), "http://localhost:8042/search/");
    }

    #[test]
    fn test_invalid_uri() {
        let err = RemoteEngine::new("not a uri", Arc::new(MappingTable::new())).unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_endpoints() {
        let engine =
            RemoteEngine::new("http://localhost:8042/sift", Arc::new(MappingTable::new()))
                .unwrap();
        assert_eq!(
            engine.endpoint("query").unwrap().as_str(),
            "http://localhost:8042/sift/query"
        );
        assert_eq!(
            engine.endpoint("index").unwrap().as_str(),
            "http://localhost:8042/sift/index"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_backend_failure() {
        // Port 9 (discard) is essentially never listening on loopback.
        let engine =
            RemoteEngine::new("http://127.0.0.1:9/", Arc::new(MappingTable::builtin())).unwrap();
        let err = engine.query_all("x").await.unwrap_err();
        assert!(matches!(err, Error::BackendFailure { .. }));
    }
}
