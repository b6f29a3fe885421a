//! Tantivy schema for the embedded engine.
//!
//! # Schema Fields
//!
//! - `_key`: Replacement key, `<type>:<id>` (STRING)
//! - `_id`: Document identifier (STRING | STORED)
//! - `_type`: Document type (STRING | FAST | STORED)
//! - `content`: Flattened tokens joined with ` <> ` (TEXT | STORED)
//!
//! # Tokenizer
//!
//! `content` uses the English stemming tokenizer (`en_stem`):
//! SimpleTokenizer → LowerCaser → Stemmer(English).

use tantivy::Index;
use tantivy::schema::{
    FAST, Field, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};
use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, TextAnalyzer};

use sift_core::{Error, Result};

/// Name the stemming analyzer is registered under.
pub const TOKENIZER_NAME: &str = "en_stem";

/// Schema holding field references and the Tantivy schema.
#[derive(Clone)]
pub struct IndexSchema {
    schema: Schema,

    /// Replacement key (`<type>:<id>`).
    pub key: Field,
    /// Document identifier.
    pub id: Field,
    /// Document type.
    pub doc_type: Field,
    /// Flattened token content.
    pub content: Field,
}

impl IndexSchema {
    /// Build the schema.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let content_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(TOKENIZER_NAME)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let key = builder.add_text_field("_key", STRING);
        let id = builder.add_text_field("_id", STRING | STORED);
        let doc_type = builder.add_text_field("_type", STRING | FAST | STORED);
        let content = builder.add_text_field("content", content_options);

        Self {
            schema: builder.build(),
            key,
            id,
            doc_type,
            content,
        }
    }

    /// Recover field handles from an existing index's schema.
    pub fn from_schema(schema: Schema) -> Result<Self> {
        let field = |name: &str| {
            schema.get_field(name).map_err(|_| {
                Error::backend(format!("Existing index has no '{name}' field"))
            })
        };
        Ok(Self {
            key: field("_key")?,
            id: field("_id")?,
            doc_type: field("_type")?,
            content: field("content")?,
            schema: schema.clone(),
        })
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the stemming analyzer with an index.
    ///
    /// Must be called after creating or opening an index.
    pub fn register_tokenizers(index: &Index) {
        let en_stem = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(Stemmer::new(Language::English))
            .build();

        index.tokenizers().register(TOKENIZER_NAME, en_stem);
    }

    /// Replacement key for a document.
    pub fn key_for(doc_type: &str, id: &str) -> String {
        format!("{doc_type}:{id}")
    }
}

impl std::fmt::Debug for IndexSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSchema")
            .field("fields", &["_key", "_id", "_type", "content"])
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_field_names() {
        let schema = IndexSchema::build();
        let tantivy_schema = schema.schema();
        assert!(tantivy_schema.get_field("_key").is_ok());
        assert!(tantivy_schema.get_field("_id").is_ok());
        assert!(tantivy_schema.get_field("_type").is_ok());
        assert!(tantivy_schema.get_field("content").is_ok());
    }

    #[test]
    fn test_field_types() {
        let schema = IndexSchema::build();
        let tantivy_schema = schema.schema();

        let key_entry = tantivy_schema.get_field_entry(schema.key);
        assert!(key_entry.is_indexed());
        assert!(!key_entry.is_stored());

        let type_entry = tantivy_schema.get_field_entry(schema.doc_type);
        assert!(type_entry.is_fast());
        assert!(type_entry.is_stored());

        let content_entry = tantivy_schema.get_field_entry(schema.content);
        assert!(content_entry.is_indexed());
        assert!(content_entry.is_stored());
    }

    #[test]
    fn test_from_schema_round_trip() {
        let built = IndexSchema::build();
        let recovered = IndexSchema::from_schema(built.schema().clone()).unwrap();
        assert_eq!(recovered.content, built.content);
        assert_eq!(recovered.doc_type, built.doc_type);
    }

    #[test]
    fn test_from_schema_missing_field() {
        let mut builder = SchemaBuilder::new();
        builder.add_text_field("id", STRING | STORED);
        let err = IndexSchema::from_schema(builder.build()).unwrap_err();
        assert_eq!(err.kind(), "backend_failure");
    }

    #[test]
    fn test_tokenizer_registration() {
        let schema = IndexSchema::build();
        let index = Index::create_in_ram(schema.schema().clone());
        IndexSchema::register_tokenizers(&index);
        assert!(index.tokenizers().get(TOKENIZER_NAME).is_some());
    }

    #[test]
    fn test_key_for() {
        assert_eq!(IndexSchema::key_for("status/twitter", "42"), "status/twitter:42");
    }
}
