//! Index engines, engine selection, serialized indexing, and query dispatch.
//!
//! # Features
//!
//! - `engine-tantivy`: embedded full-text engine backed by Tantivy
//! - `engine-remote`: engine that forwards to a Sift provider over HTTP
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      sift-engine                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Search (facade)                                            │
//! │  ├── IndexQueue      FIFO, one engine call in flight        │
//! │  └── QueryDispatcher forwards to the active engine          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EngineRegistry (active engine, Null fallback)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexEngine trait                                          │
//! │  ├── NullEngine     (always unavailable)                    │
//! │  ├── TantivyEngine  (embedded index)                        │
//! │  └── RemoteEngine   (HTTP provider)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sift_engine::Search;
//! use sift_mapping::MappingTable;
//!
//! let search = Search::from_config(config.engine.clone(), MappingTable::builtin());
//! let receipt = search
//!     .index("photo", json!({"id": "p1", "caption": "Sunset", "title": "Beach"}))
//!     .await?;
//! let results = search.query_type("photo", "sunset").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod dispatch;
pub mod queue;
pub mod registry;
pub mod service;
pub mod types;

#[cfg(feature = "engine-tantivy")]
pub mod schema;

#[cfg(feature = "engine-tantivy")]
pub mod tantivy_engine;

#[cfg(feature = "engine-remote")]
pub mod remote;

// Re-exports
pub use backend::{IndexEngine, NullEngine};
pub use dispatch::QueryDispatcher;
pub use queue::{IndexQueue, QueueState};
pub use registry::{EngineKind, EngineRegistry, create_engine};
pub use service::Search;
pub use sift_core::EngineConfig;
pub use types::{IndexReceipt, QueryResults, SearchHit};

#[cfg(feature = "engine-tantivy")]
pub use schema::IndexSchema;

#[cfg(feature = "engine-tantivy")]
pub use tantivy_engine::TantivyEngine;

#[cfg(feature = "engine-remote")]
pub use remote::RemoteEngine;
