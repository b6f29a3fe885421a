//! Relay queries to a search provider.

use std::time::Instant;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Error, Result, SiftConfig};

use crate::provider::{ProviderRegistry, SearchProvider};

/// Envelope returned by [`QueryRelay::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Round-trip time in milliseconds.
    pub took: u64,
    /// The provider's hit list.
    pub hits: RelayHits,
}

/// Hit list as the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayHits {
    /// Parsed provider response body.
    pub hits: Value,
    /// Always `None`; providers do not report a total.
    pub total: Option<u64>,
}

/// Forwards queries to the first configured provider.
#[derive(Debug, Clone)]
pub struct QueryRelay {
    client: Client,
    providers: ProviderRegistry,
}

impl QueryRelay {
    /// A relay over `providers`.
    pub fn new(providers: ProviderRegistry) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, providers })
    }

    /// A relay over the providers in `config`.
    pub fn from_config(config: &SiftConfig) -> Result<Self> {
        Self::new(ProviderRegistry::from_config(&config.providers)?)
    }

    /// Configured providers.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Query the first provider for `term`, optionally restricted to
    /// `doc_type`.
    ///
    /// `offset` and `limit` are accepted but not forwarded; the provider
    /// decides how many hits to return.
    pub async fn search(
        &self,
        doc_type: Option<&str>,
        term: &str,
        offset: Option<usize>,
        limit: Option<usize>,
    ) -> Result<RelayResponse> {
        let provider = self.providers.first()?;
        if offset.is_some() || limit.is_some() {
            log::debug!("Relay ignores offset={offset:?} limit={limit:?}");
        }

        let started = Instant::now();
        let hits = self.fetch(provider, doc_type, term).await?;
        Ok(RelayResponse {
            took: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            hits: RelayHits { hits, total: None },
        })
    }

    async fn fetch(
        &self,
        provider: &SearchProvider,
        doc_type: Option<&str>,
        term: &str,
    ) -> Result<Value> {
        let url = provider.query_url(doc_type, term)?;
        log::debug!("Relaying query to {} at {url}", provider.name());
        let failed = |message: String| Error::provider_request(url.as_str(), message);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("status {status}")));
        }

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(failed("empty response body".to_string()));
        }
        serde_json::from_str(&body).map_err(|e| failed(format!("invalid JSON: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
