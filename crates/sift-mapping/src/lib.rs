//! Type mappings and document flattening.
//!
//! A [`Mapping`] describes which fields of a document carry searchable text.
//! [`flatten`] walks a document alongside its mapping and collects those
//! fields as an ordered token list; [`MappingTable`] keys mappings by
//! document type and resolves a document into a [`PreparedDocument`] ready
//! for an index engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sift_mapping::MappingTable;
//!
//! let table = MappingTable::builtin();
//! let doc = json!({"id": "p1", "caption": "Sunset", "title": "Beach"});
//! let prepared = table.prepare("photo", &doc)?;
//! assert_eq!(prepared.content(), "Sunset <> Beach");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod flatten;
pub mod mapping;
pub mod table;

pub use flatten::{PreparedDocument, TOKEN_SEPARATOR, flatten, prepare, resolve_id};
pub use mapping::{ID_KEY, Mapping};
pub use table::MappingTable;
