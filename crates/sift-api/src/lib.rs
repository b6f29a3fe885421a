//! # sift-api
//!
//! HTTP provider endpoint for Sift.
//!
//! Exposes a [`Search`](sift_engine::Search) service over the wire protocol
//! the query relay and the remote engine speak:
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `GET` | `/query?q=<q>[&type=<t>]` | | JSON array of hits |
//! | `POST` | `/index/{type}` | document | receipt |
//! | `POST` | `/index` | prepared document | receipt |
//! | `GET` | `/health` | | engine status |
//!
//! Indexing requests go through the service's indexing queue.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, Error, Result};
pub use routes::router;
pub use server::Server;
