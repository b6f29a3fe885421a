//! Endpoint server.

use std::future::Future;
use std::sync::Arc;

use sift_engine::Search;
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::routes::router;

/// Serves a [`Search`] over HTTP.
pub struct Server {
    search: Arc<Search>,
    bind: String,
}

impl Server {
    /// A server for `search` listening on `bind` (`host:port`).
    pub fn new(search: Arc<Search>, bind: impl Into<String>) -> Self {
        Self {
            search,
            bind: bind.into(),
        }
    }

    /// Address the server binds.
    pub fn bind(&self) -> &str {
        &self.bind
    }

    /// Bind and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.bind)
            .await
            .map_err(|source| Error::Bind {
                addr: self.bind.clone(),
                source,
            })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            log::info!(
                "Sift provider listening on http://{addr}/ (engine {})",
                self.search.engine_name()
            );
        }
        axum::serve(listener, router(self.search))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(Error::Serve)?;
        log::info!("Sift provider stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("bind", &self.bind)
            .field("search", &self.search)
            .finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
