//! The mapping table: document type → mapping.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Error, Result};

use crate::flatten::{PreparedDocument, prepare};
use crate::mapping::Mapping;

/// Mappings for the document types Sift knows out of the box.
const BUILTIN_MAPPINGS: &str = r#"{
    "contact": {
        "_id": "_id",
        "name": "name",
        "nicknames": [],
        "email": [{"value": "value"}],
        "im": [{"value": "value"}],
        "address": [{"value": "value"}]
    },
    "photo": {
        "_id": "id",
        "caption": "caption",
        "title": "title"
    },
    "status/twitter": {
        "_id": "id",
        "text": "text",
        "user": {"name": "name", "screen_name": "screen_name"}
    },
    "status/facebook": {
        "_id": "id",
        "description": "description",
        "message": "message",
        "from": {"name": "name"}
    }
}"#;

/// Type mappings keyed by document type.
///
/// Every root mapping is an object with a string `_id` entry; [`insert`]
/// and the loaders enforce this.
///
/// [`insert`]: MappingTable::insert
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingTable {
    types: BTreeMap<String, Mapping>,
}

impl MappingTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table (`contact`, `photo`, `status/twitter`,
    /// `status/facebook`).
    pub fn builtin() -> Self {
        match Self::from_json_str(BUILTIN_MAPPINGS) {
            Ok(table) => table,
            Err(e) => {
                log::error!("Built-in mappings are invalid: {e}");
                Self::new()
            }
        }
    }

    /// Parse a JSON object of `type → mapping`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Mapping> =
            serde_json::from_str(text).map_err(|e| Error::invalid_mapping(e.to_string()))?;
        let mut table = Self::new();
        for (doc_type, mapping) in raw {
            table.insert(doc_type, mapping)?;
        }
        Ok(table)
    }

    /// Read a JSON mappings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_json_str(&text).map_err(|e| {
            Error::invalid_mapping(format!("{}: {e}", path.display()))
        })
    }

    /// Add or replace the mapping for `doc_type`.
    pub fn insert(&mut self, doc_type: impl Into<String>, mapping: Mapping) -> Result<()> {
        let doc_type = doc_type.into();
        mapping.validate_root(&doc_type)?;
        if self.types.insert(doc_type.clone(), mapping).is_some() {
            log::debug!("Replaced mapping for type {doc_type}");
        }
        Ok(())
    }

    /// Merge `other` into this table; its entries win.
    pub fn extend(&mut self, other: MappingTable) {
        self.types.extend(other.types);
    }

    /// Mapping for `doc_type`, if any.
    pub fn get(&self, doc_type: &str) -> Option<&Mapping> {
        self.types.get(doc_type)
    }

    /// Whether `doc_type` has a mapping.
    pub fn contains(&self, doc_type: &str) -> bool {
        self.types.contains_key(doc_type)
    }

    /// Known document types, sorted.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Number of mapped types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table has no mappings.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Select the mapping for `doc_type` and prepare `document` with it.
    pub fn prepare(&self, doc_type: &str, document: &Value) -> Result<PreparedDocument> {
        let mapping = self
            .get(doc_type)
            .ok_or_else(|| Error::mapping_not_found(doc_type))?;
        prepare(doc_type, document, mapping)
    }

    /// Pretty JSON rendering of the table.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'de> Deserialize<'de> for MappingTable {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Mapping>::deserialize(deserializer)?;
        let mut table = MappingTable::new();
        for (doc_type, mapping) in raw {
            table
                .insert(doc_type, mapping)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(table)
    }
}

// ============================================================================
// Tests
// ============================================================================
