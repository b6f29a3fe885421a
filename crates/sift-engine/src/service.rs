//! The `Search` facade.
//!
//! Bundles the mapping table, the engine registry, the indexing queue and the
//! query dispatcher behind one handle.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sift_engine::Search;
//!
//! let search = Search::from_config(config.effective_engine(), mappings);
//! search.submit("contact", doc, |result| log::info!("{result:?}"));
//! let hits = search.query_all("ann").await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use sift_core::util::paths::ensure_dir;
use sift_core::{EngineConfig, Result};
use sift_mapping::{MappingTable, PreparedDocument};

use crate::backend::IndexEngine;
use crate::dispatch::QueryDispatcher;
use crate::queue::{IndexQueue, QueueState};
use crate::registry::EngineRegistry;
use crate::types::{IndexReceipt, QueryResults};

/// Indexing and query entry point.
pub struct Search {
    config: EngineConfig,
    mappings: Arc<MappingTable>,
    registry: Arc<EngineRegistry>,
    queue: IndexQueue,
    dispatcher: QueryDispatcher,
}

impl Search {
    /// A search service with the null engine active.
    pub fn new(config: EngineConfig, mappings: MappingTable) -> Self {
        let registry = Arc::new(EngineRegistry::new());
        let queue = IndexQueue::new(Arc::clone(&registry)).with_timeout(config.index_timeout());
        let dispatcher = QueryDispatcher::new(Arc::clone(&registry));
        Self {
            config,
            mappings: Arc::new(mappings),
            registry,
            queue,
            dispatcher,
        }
    }

    /// A search service with the engine named in `config` active.
    ///
    /// Engine construction failures, including an index directory that
    /// cannot be created, leave the null engine active.
    pub fn from_config(config: EngineConfig, mappings: MappingTable) -> Self {
        let search = Self::new(config, mappings);
        let name = search.config.name.clone();
        search.set_engine_by_name(&name);
        search
    }

    /// Use `path` as the embedded index directory, creating it if absent.
    ///
    /// Takes effect on the next engine selection.
    pub fn set_index_path(&mut self, path: &Path) -> Result<()> {
        ensure_dir(path)?;
        self.config.index_path = Some(path.to_string_lossy().into_owned());
        Ok(())
    }

    /// Install the engine built by `constructor`, or the null engine if it
    /// fails.
    pub fn set_engine<F>(&self, constructor: F) -> Arc<dyn IndexEngine>
    where
        F: FnOnce() -> Result<Arc<dyn IndexEngine>>,
    {
        self.registry.set_engine(constructor)
    }

    /// Install the engine called `name`, or the null engine if the name is
    /// unknown or construction fails.
    pub fn set_engine_by_name(&self, name: &str) -> Arc<dyn IndexEngine> {
        self.registry
            .set_engine_by_name(name, &self.config, Arc::clone(&self.mappings))
    }

    /// Name of the active engine.
    pub fn engine_name(&self) -> String {
        self.registry.current().name().to_string()
    }

    /// Whether the active engine can serve requests.
    pub fn is_available(&self) -> bool {
        self.registry.current().is_available()
    }

    /// The mapping table engines resolve documents with.
    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    /// Shared handle to the mapping table.
    pub fn mappings_handle(&self) -> Arc<MappingTable> {
        Arc::clone(&self.mappings)
    }

    /// Engine configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The engine registry.
    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// The indexing queue.
    pub fn queue(&self) -> &IndexQueue {
        &self.queue
    }

    /// Queue a document and wait for its result.
    pub async fn index(&self, doc_type: &str, document: Value) -> Result<IndexReceipt> {
        self.queue.index(doc_type, document).await
    }

    /// Queue a prepared document and wait for its result.
    pub async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt> {
        self.queue.index_prepared(document).await
    }

    /// Queue a document; `completion` receives the result later.
    pub fn submit<F>(&self, doc_type: &str, document: Value, completion: F)
    where
        F: FnOnce(Result<IndexReceipt>) + Send + 'static,
    {
        self.queue.submit(doc_type, document, completion);
    }

    /// Query documents of one type.
    pub async fn query_type(&self, doc_type: &str, query: &str) -> Result<QueryResults> {
        self.dispatcher.query_type(doc_type, query).await
    }

    /// Query documents of every type.
    pub async fn query_all(&self, query: &str) -> Result<QueryResults> {
        self.dispatcher.query_all(query).await
    }

    /// Query one type, or all types when `doc_type` is `None` or empty.
    pub async fn query(&self, doc_type: Option<&str>, query: &str) -> Result<QueryResults> {
        self.dispatcher.query(doc_type, query).await
    }

    /// Drain state of the indexing queue.
    pub fn queue_state(&self) -> QueueState {
        self.queue.state()
    }
}

impl std::fmt::Debug for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("engine", &self.engine_name())
            .field("types", &self.mappings.len())
            .field("queue", &self.queue)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
