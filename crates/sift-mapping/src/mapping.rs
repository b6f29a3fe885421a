//! The mapping tree.
//!
//! In JSON form a mapping mirrors the document shape it describes:
//!
//! - a string names a field whose scalar value is indexed,
//! - an object maps keys to nested mappings (order is significant),
//! - an array holds zero or one element mapping applied to every element of
//!   the matching document array.
//!
//! ```json
//! {"_id": "_id", "name": "name", "nicknames": [], "email": [{"value": "value"}]}
//! ```

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use sift_core::{Error, Result};

/// Reserved key naming the identifier field. Never indexed as content.
pub const ID_KEY: &str = "_id";

/// A node in a type mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    /// Index the scalar found under this field name.
    Field(String),
    /// Nested object; entries are visited in this order.
    Object(Vec<(String, Mapping)>),
    /// Array whose elements all share the optional element mapping.
    Array(Option<Box<Mapping>>),
}

impl Mapping {
    /// A field leaf.
    pub fn field(name: impl Into<String>) -> Self {
        Mapping::Field(name.into())
    }

    /// An object node from ordered entries.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Mapping)>,
    {
        Mapping::Object(entries.into_iter().map(|(k, m)| (k.into(), m)).collect())
    }

    /// An array node with an element mapping.
    pub fn array(element: Mapping) -> Self {
        Mapping::Array(Some(Box::new(element)))
    }

    /// An array node without an element mapping; only scalar elements are
    /// indexed.
    pub fn scalar_array() -> Self {
        Mapping::Array(None)
    }

    /// Look up an entry of an object mapping.
    pub fn get(&self, key: &str) -> Option<&Mapping> {
        match self {
            Mapping::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, m)| m),
            _ => None,
        }
    }

    /// The document field holding the identifier, from the `_id` entry.
    pub fn id_field(&self) -> Option<&str> {
        match self.get(ID_KEY) {
            Some(Mapping::Field(name)) => Some(name),
            _ => None,
        }
    }

    /// The document key to read for the entry `key` whose mapping is `self`.
    ///
    /// Structured entries are looked up under their own key; field leaves
    /// under the field name they carry.
    pub fn lookup_key<'a>(&'a self, key: &'a str) -> &'a str {
        match self {
            Mapping::Field(name) => name,
            Mapping::Object(_) | Mapping::Array(_) => key,
        }
    }

    /// Convert a parsed JSON value into a mapping.
    ///
    /// Entry order follows the value's own map order, which is sorted unless
    /// `serde_json` preserves insertion order. Parse from text when order
    /// matters.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::invalid_mapping(e.to_string()))
    }

    /// Check that this mapping can serve as a type's root mapping.
    pub fn validate_root(&self, doc_type: &str) -> Result<()> {
        if !matches!(self, Mapping::Object(_)) {
            return Err(Error::invalid_mapping(format!(
                "mapping for '{doc_type}' must be an object"
            )));
        }
        if self.id_field().is_none() {
            return Err(Error::invalid_mapping(format!(
                "mapping for '{doc_type}' has no string '{ID_KEY}' entry"
            )));
        }
        Ok(())
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Mapping::Field(name) => serializer.serialize_str(name),
            Mapping::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, mapping) in entries {
                    map.serialize_entry(key, mapping)?;
                }
                map.end()
            }
            Mapping::Array(element) => {
                let mut seq = serializer.serialize_seq(Some(usize::from(element.is_some())))?;
                if let Some(element) = element {
                    seq.serialize_element(element.as_ref())?;
                }
                seq.end()
            }
        }
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = Mapping;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a field name, an object of mappings, or an array of at most one mapping")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Mapping, E> {
        Ok(Mapping::Field(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Mapping, E> {
        Ok(Mapping::Field(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Mapping, A::Error> {
        let mut entries: Vec<(String, Mapping)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Mapping>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(de::Error::custom(format!("duplicate mapping key '{key}'")));
            }
            entries.push((key, value));
        }
        Ok(Mapping::Object(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Mapping, A::Error> {
        let element: Option<Mapping> = seq.next_element()?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Ok(Mapping::Array(element.map(Box::new)))
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(MappingVisitor)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_preserves_key_order() {
        let mapping: Mapping =
            serde_json::from_str(r#"{"_id":"id","zeta":"zeta","alpha":"alpha","mid":"mid"}"#)
                .unwrap();
        let Mapping::Object(entries) = mapping else {
            unreachable!("expected object mapping");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["_id", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_nested_shapes() {
        let mapping = Mapping::from_value(json!({
            "_id": "_id",
            "nicknames": [],
            "email": [{"value": "value"}],
            "user": {"name": "name"}
        }))
        .unwrap();
        assert_eq!(mapping.get("nicknames"), Some(&Mapping::scalar_array()));
        assert_eq!(
            mapping.get("email"),
            Some(&Mapping::array(Mapping::object([(
                "value",
                Mapping::field("value")
            )])))
        );
        assert_eq!(
            mapping.get("user"),
            Some(&Mapping::object([("name", Mapping::field("name"))]))
        );
        assert_eq!(mapping.id_field(), Some("_id"));
    }

    #[test]
    fn test_parse_rejects_multi_element_array() {
        let err = Mapping::from_value(json!({"_id": "id", "tags": ["a", "b"]})).unwrap_err();
        assert_eq!(err.kind(), "invalid_mapping");
    }

    #[test]
    fn test_parse_rejects_non_mapping_values() {
        assert!(Mapping::from_value(json!({"_id": "id", "count": 3})).is_err());
        assert!(Mapping::from_value(json!(null)).is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_keys() {
        let result: std::result::Result<Mapping, _> =
            serde_json::from_str(r#"{"_id":"id","a":"a","a":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_keeps_order() {
        let mapping = Mapping::object([
            ("_id", Mapping::field("id")),
            ("text", Mapping::field("text")),
            ("tags", Mapping::scalar_array()),
        ]);
        assert_eq!(
            serde_json::to_string(&mapping).unwrap(),
            r#"{"_id":"id","text":"text","tags":[]}"#
        );
    }

    #[test]
    fn test_lookup_key() {
        let leaf = Mapping::field("screen_name");
        assert_eq!(leaf.lookup_key("handle"), "screen_name");
        let nested = Mapping::object([("name", Mapping::field("name"))]);
        assert_eq!(nested.lookup_key("user"), "user");
        assert_eq!(Mapping::scalar_array().lookup_key("tags"), "tags");
    }

    #[test]
    fn test_validate_root() {
        assert!(Mapping::object([("_id", Mapping::field("id"))]).validate_root("t").is_ok());
        assert!(Mapping::field("id").validate_root("t").is_err());
        assert!(Mapping::object([("text", Mapping::field("text"))]).validate_root("t").is_err());
        assert!(
            Mapping::object([("_id", Mapping::scalar_array())])
                .validate_root("t")
                .is_err()
        );
    }
}
