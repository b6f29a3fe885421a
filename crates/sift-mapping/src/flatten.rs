//! Flattening documents into index tokens.
//!
//! [`flatten`] walks a document depth-first, guided by its [`Mapping`], and
//! collects every non-empty scalar the mapping points at. [`prepare`] adds
//! identifier resolution and rejects documents that yield nothing to index.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Error, Result};

use crate::mapping::{ID_KEY, Mapping};

/// Separator placed between tokens in the stored content string.
pub const TOKEN_SEPARATOR: &str = " <> ";

/// A document resolved against its type mapping, ready for an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedDocument {
    /// Document type the mapping was selected by.
    pub doc_type: String,
    /// Identifier in string form; the engine's document key.
    pub id: String,
    /// Tokens in traversal order. Never empty.
    pub tokens: Vec<String>,
}

impl PreparedDocument {
    /// Tokens joined with [`TOKEN_SEPARATOR`].
    pub fn content(&self) -> String {
        self.tokens.join(TOKEN_SEPARATOR)
    }
}

/// Collect the indexable tokens of `document` in traversal order.
///
/// Fields the document lacks are skipped. `_id` entries are never visited.
pub fn flatten(document: &Value, mapping: &Mapping) -> Vec<String> {
    let mut tokens = Vec::new();
    collect(document, Some(mapping), &mut tokens);
    tokens
}

fn collect(value: &Value, mapping: Option<&Mapping>, tokens: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            let element = match mapping {
                Some(Mapping::Array(element)) => element.as_deref(),
                _ => None,
            };
            // Without an element mapping, nested arrays still yield their
            // scalars and objects yield nothing.
            for item in items {
                collect(item, element, tokens);
            }
        }
        Value::Object(fields) => {
            let Some(Mapping::Object(entries)) = mapping else {
                return;
            };
            for (key, sub) in entries {
                if key == ID_KEY {
                    continue;
                }
                if let Some(child) = fields.get(sub.lookup_key(key)) {
                    collect(child, Some(sub), tokens);
                }
            }
        }
        scalar => push_scalar(scalar, tokens),
    }
}

fn push_scalar(value: &Value, tokens: &mut Vec<String>) {
    if let Some(token) = scalar_token(value) {
        tokens.push(token);
    }
}

/// String form of a non-empty scalar. `null`, `""`, `0`, `false` and
/// structured values yield `None`.
fn scalar_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if is_zero(n) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64().is_some_and(|f| f == 0.0 || f.is_nan())
}

/// Read the identifier named by the mapping's `_id` entry from the top level
/// of `document`.
///
/// Only non-empty strings and non-zero numbers are identifiers.
pub fn resolve_id(doc_type: &str, document: &Value, mapping: &Mapping) -> Result<String> {
    let field = mapping
        .id_field()
        .ok_or_else(|| Error::missing_identifier(doc_type))?;
    match document.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) if !is_zero(n) => Ok(n.to_string()),
        _ => Err(Error::missing_identifier(doc_type)),
    }
}

/// Resolve the identifier and flatten `document`.
///
/// Fails with [`Error::MissingIdentifier`] or [`Error::NoTokensFound`].
pub fn prepare(doc_type: &str, document: &Value, mapping: &Mapping) -> Result<PreparedDocument> {
    let id = resolve_id(doc_type, document, mapping)?;
    let tokens = flatten(document, mapping);
    if tokens.is_empty() {
        return Err(Error::no_tokens(doc_type, id));
    }
    Ok(PreparedDocument {
        doc_type: doc_type.to_string(),
        id,
        tokens,
    })
}

// ============================================================================
// Tests
// ============================================================================
