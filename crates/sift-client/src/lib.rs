//! # sift-client
//!
//! Query relay for Sift.
//!
//! The relay forwards a text query to the first configured search provider
//! and wraps whatever hit list it returns in a small envelope:
//!
//! ```json
//! {"took": 12, "hits": {"hits": [...], "total": null}}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sift_client::QueryRelay;
//!
//! let relay = QueryRelay::from_config(&config)?;
//! let response = relay.search(Some("contact"), "ann", None, None).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod provider;
pub mod relay;

pub use provider::{ProviderRegistry, SearchProvider};
pub use relay::{QueryRelay, RelayHits, RelayResponse};
pub use sift_core::{Error, Result};
