//! Embedded engine backed by a Tantivy index.
//!
//! Each indexing request replaces any document with the same type and
//! identifier, commits, and reloads the reader so the document is visible to
//! the next query. Tantivy calls block, so they run on Tokio's blocking pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sift_engine::{IndexEngine, TantivyEngine};
//!
//! let engine = TantivyEngine::open(&index_path, mappings, &config)?;
//! let receipt = engine.index_type("photo", &doc).await?;
//! let results = engine.query_type("photo", "sunset").await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use sift_core::util::paths::ensure_dir;
use sift_core::{EngineConfig, Error, Result};
use sift_mapping::{MappingTable, PreparedDocument};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value as _};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::backend::IndexEngine;
use crate::schema::IndexSchema;
use crate::types::{IndexReceipt, QueryResults, SearchHit};

/// Smallest writer budget Tantivy accepts for a single indexing thread.
const MIN_WRITER_BUFFER_SIZE: usize = 15_000_000;

struct Shared {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    schema: IndexSchema,
}

/// Tantivy-based index engine.
pub struct TantivyEngine {
    shared: Arc<Shared>,
    mappings: Arc<MappingTable>,
    default_limit: usize,
    location: Option<PathBuf>,
}

impl TantivyEngine {
    /// Name reported by [`IndexEngine::name`].
    pub const NAME: &'static str = "tantivy";

    /// Create or open an index in `index_path`.
    ///
    /// The directory is created if it does not exist. An existing index is
    /// reopened when the directory holds `meta.json`.
    pub fn open(
        index_path: &Path,
        mappings: Arc<MappingTable>,
        config: &EngineConfig,
    ) -> Result<Self> {
        ensure_dir(index_path)?;

        let (index, schema) = if Self::index_exists(index_path) {
            let index = Index::open_in_dir(index_path).map_err(|e| {
                Error::backend_with_source(
                    format!("Failed to open index at {}", index_path.display()),
                    e,
                )
            })?;
            let schema = IndexSchema::from_schema(index.schema())?;
            (index, schema)
        } else {
            let schema = IndexSchema::build();
            let index = Index::create_in_dir(index_path, schema.schema().clone()).map_err(|e| {
                Error::backend_with_source(
                    format!("Failed to create index at {}", index_path.display()),
                    e,
                )
            })?;
            (index, schema)
        };

        log::info!("Opened search index at {}", index_path.display());
        Self::from_index(index, schema, mappings, config, Some(index_path.to_path_buf()))
    }

    /// Create an in-memory index.
    pub fn in_memory(mappings: Arc<MappingTable>, config: &EngineConfig) -> Result<Self> {
        let schema = IndexSchema::build();
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, mappings, config, None)
    }

    /// Check if an index exists at the given path.
    pub fn index_exists(index_path: &Path) -> bool {
        index_path.join("meta.json").exists()
    }

    fn from_index(
        index: Index,
        schema: IndexSchema,
        mappings: Arc<MappingTable>,
        config: &EngineConfig,
        location: Option<PathBuf>,
    ) -> Result<Self> {
        IndexSchema::register_tokenizers(&index);

        let budget = config.writer_buffer_bytes.max(MIN_WRITER_BUFFER_SIZE);
        let writer = index
            .writer_with_num_threads(1, budget)
            .map_err(|e| Error::backend_with_source("Failed to create index writer", e))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::backend_with_source("Failed to create index reader", e))?;

        Ok(Self {
            shared: Arc::new(Shared {
                index,
                reader,
                writer: Mutex::new(writer),
                schema,
            }),
            mappings,
            default_limit: config.default_limit,
            location,
        })
    }

    /// Number of live documents visible to queries.
    pub fn num_docs(&self) -> u64 {
        self.shared.reader.searcher().num_docs()
    }

    async fn search(&self, doc_type: Option<&str>, query: &str) -> Result<QueryResults> {
        let shared = Arc::clone(&self.shared);
        let doc_type = doc_type.map(str::to_string);
        let query = query.to_string();
        let limit = self.default_limit;
        let started = Instant::now();

        let (hits, total) = tokio::task::spawn_blocking(move || {
            search_blocking(&shared, doc_type.as_deref(), &query, limit)
        })
        .await
        .map_err(|e| Error::backend_with_source("Search task failed", e))??;

        Ok(QueryResults {
            hits,
            total,
            engine: Self::NAME.to_string(),
            took_ms: elapsed_ms(started),
        })
    }
}

fn add_blocking(shared: &Shared, document: &PreparedDocument) -> Result<u64> {
    let s = &shared.schema;
    let key = IndexSchema::key_for(&document.doc_type, &document.id);
    let key_term = Term::from_field_text(s.key, &key);

    let mut writer = shared.writer.lock().unwrap_or_else(PoisonError::into_inner);

    let existing = TermQuery::new(key_term.clone(), IndexRecordOption::Basic);
    let replaced = shared
        .reader
        .searcher()
        .search(&existing, &Count)
        .map_err(|e| Error::backend_with_source("Failed to look up existing document", e))?;

    let mut doc = TantivyDocument::new();
    doc.add_text(s.key, &key);
    doc.add_text(s.id, &document.id);
    doc.add_text(s.doc_type, &document.doc_type);
    doc.add_text(s.content, document.content());

    writer.delete_term(key_term);
    let staged = writer
        .add_document(doc)
        .and_then(|_| writer.commit())
        .map_err(|e| Error::backend_with_source("Failed to commit document", e));
    if let Err(e) = staged {
        if let Err(rollback) = writer.rollback() {
            log::error!("Index rollback failed: {rollback}");
        }
        return Err(e);
    }
    drop(writer);

    shared
        .reader
        .reload()
        .map_err(|e| Error::backend_with_source("Failed to reload index reader", e))?;

    Ok(replaced as u64)
}

fn search_blocking(
    shared: &Shared,
    doc_type: Option<&str>,
    query: &str,
    limit: usize,
) -> Result<(Vec<SearchHit>, usize)> {
    let s = &shared.schema;

    let parser = QueryParser::for_index(&shared.index, vec![s.content]);
    let text_query = parser
        .parse_query(query)
        .map_err(|e| Error::backend_with_source(format!("Invalid query {query:?}"), e))?;

    let query: Box<dyn Query> = match doc_type {
        Some(doc_type) => {
            let type_query = TermQuery::new(
                Term::from_field_text(s.doc_type, doc_type),
                IndexRecordOption::Basic,
            );
            Box::new(BooleanQuery::new(vec![
                (Occur::Must, text_query),
                (Occur::Must, Box::new(type_query)),
            ]))
        }
        None => text_query,
    };

    let searcher = shared.reader.searcher();
    let total = searcher
        .search(&*query, &Count)
        .map_err(|e| Error::backend_with_source("Failed to count matches", e))?;
    let top_docs = searcher
        .search(&*query, &TopDocs::with_limit(limit.max(1)))
        .map_err(|e| Error::backend_with_source("Failed to execute query", e))?;

    let mut hits = Vec::with_capacity(top_docs.len());
    for (score, address) in top_docs {
        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| Error::backend_with_source("Failed to load stored document", e))?;
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        hits.push(SearchHit {
            id: text(s.id).unwrap_or_default(),
            doc_type: text(s.doc_type).unwrap_or_default(),
            score,
            content: text(s.content),
        });
    }

    Ok((hits, total))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl IndexEngine for TantivyEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt> {
        let shared = Arc::clone(&self.shared);
        let id = document.id.clone();
        let doc_type = document.doc_type.clone();
        let started = Instant::now();

        let replaced = tokio::task::spawn_blocking(move || add_blocking(&shared, &document))
            .await
            .map_err(|e| Error::backend_with_source("Indexing task failed", e))??;

        let took_ms = elapsed_ms(started);
        log::debug!("Indexed {doc_type} {id} in {took_ms}ms (replaced {replaced})");
        Ok(IndexReceipt {
            id,
            doc_type,
            took_ms,
            replaced,
        })
    }

    async fn query_type(&self, doc_type: &str, query: &str) -> Result<QueryResults> {
        self.search(Some(doc_type), query).await
    }

    async fn query_all(&self, query: &str) -> Result<QueryResults> {
        self.search(None, query).await
    }
}

impl std::fmt::Debug for TantivyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyEngine")
            .field("location", &self.location)
            .field("default_limit", &self.default_limit)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
