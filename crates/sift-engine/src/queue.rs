//! Serialized indexing queue.
//!
//! Requests are appended to a FIFO and drained by a single spawned task, so
//! at most one engine call is in flight per queue and requests start in
//! submission order. Each request's completion is invoked exactly once with
//! its own result; failures never stop the drain.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sift_engine::{EngineRegistry, IndexQueue};
//!
//! let queue = IndexQueue::new(Arc::new(EngineRegistry::new()));
//! queue.submit("photo", doc, |result| {
//!     if let Err(e) = result {
//!         log::warn!("indexing failed: {e}");
//!     }
//! });
//! let receipt = queue.index("photo", other_doc).await?;
//! ```

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use sift_core::{Error, Result};
use sift_mapping::PreparedDocument;
use tokio::sync::oneshot;

use crate::backend::IndexEngine;
use crate::registry::EngineRegistry;
use crate::types::IndexReceipt;

/// Callback receiving one request's result.
pub type Completion = Box<dyn FnOnce(Result<IndexReceipt>) + Send + 'static>;

/// Whether a drain task is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No drain task; the next submission starts one.
    Idle,
    /// A drain task is processing the backlog.
    Draining,
}

enum Payload {
    Raw { doc_type: String, document: Value },
    Prepared(PreparedDocument),
}

impl Payload {
    fn doc_type(&self) -> &str {
        match self {
            Payload::Raw { doc_type, .. } => doc_type,
            Payload::Prepared(doc) => &doc.doc_type,
        }
    }
}

struct IndexRequest {
    payload: Payload,
    completion: Completion,
}

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<IndexRequest>,
    draining: bool,
}

/// FIFO indexing queue with a single consumer.
///
/// Cloning is cheap and clones share the same queue.
#[derive(Clone)]
pub struct IndexQueue {
    registry: Arc<EngineRegistry>,
    inner: Arc<Mutex<QueueInner>>,
    timeout: Option<Duration>,
}

impl IndexQueue {
    /// A queue feeding whatever engine `registry` holds.
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self {
            registry,
            inner: Arc::new(Mutex::new(QueueInner::default())),
            timeout: None,
        }
    }

    /// Fail requests whose engine call exceeds `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enqueue a raw document. `completion` runs later on the drain task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit<F>(&self, doc_type: impl Into<String>, document: Value, completion: F)
    where
        F: FnOnce(Result<IndexReceipt>) + Send + 'static,
    {
        let payload = Payload::Raw {
            doc_type: doc_type.into(),
            document,
        };
        self.enqueue(payload, Box::new(completion));
    }

    /// Enqueue an already-resolved document.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit_prepared<F>(&self, document: PreparedDocument, completion: F)
    where
        F: FnOnce(Result<IndexReceipt>) + Send + 'static,
    {
        self.enqueue(Payload::Prepared(document), Box::new(completion));
    }

    /// Enqueue a raw document and wait for its result.
    pub async fn index(&self, doc_type: impl Into<String>, document: Value) -> Result<IndexReceipt> {
        let (tx, rx) = oneshot::channel();
        self.submit(doc_type, document, move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(Error::QueueClosed))
    }

    /// Enqueue a prepared document and wait for its result.
    pub async fn index_prepared(&self, document: PreparedDocument) -> Result<IndexReceipt> {
        let (tx, rx) = oneshot::channel();
        self.submit_prepared(document, move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(Error::QueueClosed))
    }

    /// Current drain state.
    pub fn state(&self) -> QueueState {
        if self.lock().draining {
            QueueState::Draining
        } else {
            QueueState::Idle
        }
    }

    /// Requests waiting behind the one in flight.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    fn enqueue(&self, payload: Payload, completion: Completion) {
        let start_drain = {
            let mut inner = self.lock();
            inner.pending.push_back(IndexRequest {
                payload,
                completion,
            });
            !std::mem::replace(&mut inner.draining, true)
        };
        if start_drain {
            let queue = self.clone();
            tokio::spawn(async move { queue.drain().await });
        }
    }

    async fn drain(self) {
        log::debug!("Index queue draining");
        loop {
            let request = {
                let mut inner = self.lock();
                match inner.pending.pop_front() {
                    Some(request) => request,
                    None => {
                        inner.draining = false;
                        break;
                    }
                }
            };

            let engine = self.registry.current();
            let doc_type = request.payload.doc_type().to_string();
            let result = self.run(engine.as_ref(), request.payload).await;
            if let Err(e) = &result {
                log::warn!("Failed to index {doc_type} document with {}: {e}", engine.name());
            }

            let completion = request.completion;
            if std::panic::catch_unwind(AssertUnwindSafe(move || completion(result))).is_err() {
                log::error!("Index completion for {doc_type} panicked");
            }

            tokio::task::yield_now().await;
        }
        log::debug!("Index queue idle");
    }

    async fn run(&self, engine: &dyn IndexEngine, payload: Payload) -> Result<IndexReceipt> {
        let call = async move {
            match payload {
                Payload::Raw { doc_type, document } => {
                    engine.index_type(&doc_type, &document).await
                }
                Payload::Prepared(doc) => engine.index_prepared(doc).await,
            }
        };
        let guarded = AssertUnwindSafe(call).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .map_err(|_| Error::Timeout { after: limit })?,
            None => guarded.await,
        };

        outcome.unwrap_or_else(|_| {
            Err(Error::backend(format!(
                "{} engine panicked while indexing",
                engine.name()
            )))
        })
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for IndexQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexQueue")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
