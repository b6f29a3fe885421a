//! Shared helpers for sift-engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sift_core::{Error, Result};
use sift_engine::{IndexEngine, IndexReceipt, QueryResults};
use sift_mapping::{MappingTable, PreparedDocument};

/// Engine that records call order and can delay, fail, or panic per id.
pub struct RecordingEngine {
    name: String,
    mappings: MappingTable,
    delays: HashMap<String, Duration>,
    panics: Vec<String>,
    events: Arc<Mutex<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mappings: MappingTable::builtin(),
            delays: HashMap::new(),
            panics: Vec::new(),
            events: Arc::new(Mutex::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn with_panic(mut self, id: &str) -> Self {
        self.panics.push(id.to_string());
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl IndexEngine for RecordingEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.record(format!("start:{}", document.id));

        if self.panics.contains(&document.id) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("engine blew up on {}", document.id);
        }
        if let Some(delay) = self.delays.get(&document.id) {
            tokio::time::sleep(*delay).await;
        }

        self.record(format!("end:{}", document.id));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(IndexReceipt {
            id: document.id,
            doc_type: document.doc_type,
            took_ms: 0,
            replaced: 0,
        })
    }

    async fn query_type(&self, _doc_type: &str, _query: &str) -> Result<QueryResults> {
        Ok(QueryResults::empty(&self.name))
    }

    async fn query_all(&self, _query: &str) -> Result<QueryResults> {
        Err(Error::backend("query_all not recorded"))
    }
}

/// A photo document with the given id and caption.
pub fn photo(id: &str, caption: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "caption": caption})
}
