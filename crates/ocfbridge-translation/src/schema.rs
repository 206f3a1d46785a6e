//! Schema Fragment Model
//!
//! A JSON-Schema-like tree describing one property's shape. Fragments are
//! produced by the type mapper on the way out and deserialized from the
//! document tree on the way in; unknown fields in foreign documents are
//! ignored so a partially understood entry still translates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` keyword: a single type name, or a list for unresolved unions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    One(String),
    Many(Vec<String>),
}

impl SchemaType {
    pub fn one(name: impl Into<String>) -> Self {
        Self::One(name.into())
    }

    /// The single type name, if this is not a union.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::One(name) => Some(name),
            Self::Many(_) => None,
        }
    }
}

/// The `items` keyword: one schema for homogeneous arrays, a positional
/// list for fixed-length heterogeneous ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaItems {
    One(SchemaFragment),
    Many(Vec<SchemaFragment>),
}

/// The `media` keyword carrying a binary payload encoding marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEncoding {
    #[serde(rename = "binaryEncoding")]
    pub binary_encoding: String,
}

impl MediaEncoding {
    pub fn base64() -> Self {
        Self {
            binary_encoding: "base64".to_string(),
        }
    }

    pub fn is_base64(&self) -> bool {
        self.binary_encoding == "base64"
    }
}

/// One JSON-Schema-like fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaFragment {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "readOnly", default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaItems>>,

    #[serde(rename = "minItems", default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaFragment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaEncoding>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaFragment>>,
}

impl SchemaFragment {
    /// Fragment with only a `type` keyword.
    pub fn of_type(name: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::one(name)),
            ..Default::default()
        }
    }

    /// Bounded integer fragment.
    pub fn integer(minimum: i64, maximum: i64) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
            ..Self::of_type("integer")
        }
    }

    /// String fragment with a `format` marker.
    pub fn string_format(format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::of_type("string")
        }
    }

    /// Reference to a shared named definition.
    pub fn definition_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", name)),
            ..Default::default()
        }
    }

    /// Object fragment with the given ordered properties.
    pub fn object(properties: IndexMap<String, SchemaFragment>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::of_type("object")
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = Some(true);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// The referenced definition name, when this fragment is a `$ref`.
    pub fn definition_name(&self) -> Option<&str> {
        self.reference.as_deref()?.strip_prefix("#/definitions/")
    }

    /// Whether the fragment marks the value as not writable.
    pub fn is_read_only(&self) -> bool {
        self.read_only == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fragment_serialization_is_sparse() {
        let frag = SchemaFragment::integer(0, 255);
        let value = serde_json::to_value(&frag).unwrap();
        assert_eq!(
            value,
            json!({"type": "integer", "minimum": 0, "maximum": 255})
        );
    }

    #[test]
    fn test_type_union_round_trip() {
        let frag = SchemaFragment {
            schema_type: Some(SchemaType::Many(vec![
                "string".into(),
                "integer".into(),
            ])),
            ..Default::default()
        };
        let value = serde_json::to_value(&frag).unwrap();
        assert_eq!(value, json!({"type": ["string", "integer"]}));
        let back: SchemaFragment = serde_json::from_value(value).unwrap();
        assert_eq!(back, frag);
    }

    #[test]
    fn test_definition_ref() {
        let frag = SchemaFragment::definition_ref("Extent");
        assert_eq!(frag.definition_name(), Some("Extent"));
        assert_eq!(
            serde_json::to_value(&frag).unwrap(),
            json!({"$ref": "#/definitions/Extent"})
        );
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let value = json!({"type": "string", "maxLength": 64, "x-vendor": true});
        let frag: SchemaFragment = serde_json::from_value(value).unwrap();
        assert_eq!(frag.schema_type, Some(SchemaType::one("string")));
    }

    #[test]
    fn test_items_positional_list() {
        let value = json!({
            "type": "array",
            "minItems": 2,
            "maxItems": 2,
            "items": [{"type": "integer"}, {"type": "string"}]
        });
        let frag: SchemaFragment = serde_json::from_value(value).unwrap();
        match frag.items.as_deref() {
            Some(SchemaItems::Many(list)) => assert_eq!(list.len(), 2),
            other => panic!("expected positional items, got {:?}", other),
        }
    }
}
