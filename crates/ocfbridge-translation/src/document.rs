//! Schema Document Model
//!
//! The portable top-level document: `info`, `paths`, `definitions`, in that
//! order, serialized in a compact binary map/array form (CBOR). A document
//! is built fresh per generation call and parsed fresh per parse call;
//! nothing is cached across calls.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ocfbridge_core::{config, BridgeError};

use crate::schema::SchemaFragment;

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: config::document::TITLE.to_string(),
            version: ocfbridge_core::VERSION.to_string(),
        }
    }
}

/// A query or body parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFragment>,
}

impl Parameter {
    /// The `if` query parameter enumerating supported interface tokens.
    pub fn interface_query(tokens: Vec<String>) -> Self {
        Self {
            name: "if".to_string(),
            location: "query".to_string(),
            parameter_type: Some("string".to_string()),
            enum_values: Some(tokens),
            schema: None,
        }
    }

    /// A request body carrying the given schema.
    pub fn body(schema: SchemaFragment) -> Self {
        Self {
            name: "body".to_string(),
            location: "body".to_string(),
            parameter_type: None,
            enum_values: None,
            schema: Some(schema),
        }
    }
}

/// One response of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFragment>,
}

impl Response {
    pub fn ok(schema: SchemaFragment) -> Self {
        Self {
            description: String::new(),
            schema: Some(schema),
        }
    }
}

/// One operation (GET or POST) on a path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
}

/// One entry of the `paths` section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
}

/// The portable schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub swagger: String,
    pub info: DocumentInfo,
    pub paths: IndexMap<String, PathItem>,
    pub definitions: IndexMap<String, SchemaFragment>,
}

impl SchemaDocument {
    pub fn new(paths: IndexMap<String, PathItem>, definitions: IndexMap<String, SchemaFragment>) -> Self {
        Self {
            swagger: config::document::FORMAT_VERSION.to_string(),
            info: DocumentInfo::default(),
            paths,
            definitions,
        }
    }

    /// Serialize into the compact binary form.
    pub fn to_cbor(&self) -> Result<Vec<u8>, BridgeError> {
        serde_cbor::to_vec(self).map_err(|e| BridgeError::Serialization(e.to_string()))
    }
}

/// Decode a binary document into the loosely typed tree the parser walks.
pub fn tree_from_cbor(bytes: &[u8]) -> Result<Value, BridgeError> {
    serde_cbor::from_slice(bytes).map_err(|e| BridgeError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cbor_round_trip() {
        let mut definitions = IndexMap::new();
        definitions.insert("a.false".to_string(), SchemaFragment::of_type("object"));
        let mut paths = IndexMap::new();
        paths.insert(
            "/light/1".to_string(),
            PathItem {
                get: Some(Operation::default()),
                post: None,
            },
        );
        let document = SchemaDocument::new(paths, definitions);

        let bytes = document.to_cbor().unwrap();

        // The typed model round-trips, keeping entry order
        let back: SchemaDocument = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(back, document);

        // The loosely typed tree exposes all sections
        let tree = tree_from_cbor(&bytes).unwrap();
        assert_eq!(tree["swagger"], "2.0");
        assert!(tree["info"]["title"].is_string());
        assert!(tree["paths"]["/light/1"]["get"].is_object());
        assert!(tree["paths"]["/light/1"].get("post").is_none());
        assert!(tree["definitions"]["a.false"].is_object());
    }

    #[test]
    fn test_tree_from_cbor_rejects_garbage() {
        assert!(tree_from_cbor(&[0xff, 0x00, 0x13]).is_err());
    }
}
