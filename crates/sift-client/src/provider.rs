//! Configured search providers.

use reqwest::Url;
use sift_core::util::uri::base_url;
use sift_core::{Error, ProviderConfig, Result};

/// A search provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProvider {
    name: String,
    base: Url,
}

impl SearchProvider {
    /// A provider named `name` rooted at `uri`.
    pub fn new(name: impl Into<String>, uri: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            base: base_url(uri)?,
        })
    }

    /// Provider display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider base URL (always ends with `/`).
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>query?q=<term>[&type=<type>]`, with `type` omitted when empty.
    pub fn query_url(&self, doc_type: Option<&str>, term: &str) -> Result<Url> {
        let mut url = self
            .base
            .join("query")
            .map_err(|e| Error::config(format!("Invalid provider URL {}: {e}", self.base)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", term);
            if let Some(doc_type) = doc_type.filter(|t| !t.is_empty()) {
                pairs.append_pair("type", doc_type);
            }
        }
        Ok(url)
    }
}

impl TryFrom<&ProviderConfig> for SearchProvider {
    type Error = Error;

    fn try_from(config: &ProviderConfig) -> Result<Self> {
        Self::new(config.name.clone(), &config.uri)
    }
}

/// Providers in priority order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<SearchProvider>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration, rejecting invalid URIs.
    pub fn from_config(configs: &[ProviderConfig]) -> Result<Self> {
        let providers = configs
            .iter()
            .map(SearchProvider::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { providers })
    }

    /// Append a provider.
    pub fn push(&mut self, provider: SearchProvider) {
        self.providers.push(provider);
    }

    /// The provider the relay calls.
    pub fn first(&self) -> Result<&SearchProvider> {
        self.providers.first().ok_or(Error::NoProviderFound)
    }

    /// All providers.
    pub fn iter(&self) -> impl Iterator<Item = &SearchProvider> {
        self.providers.iter()
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is configured.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
