use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// JSON Schema type of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    /// Format hint (e.g., "email")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl SchemaNode {
    /// Create an unconstrained schema of the given kind
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            format: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::of_kind(SchemaKind::String)
    }

    /// Create an array schema with the given item schema
    pub fn array(items: SchemaNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of_kind(SchemaKind::Array)
        }
    }

    /// Create an object schema.
    ///
    /// Names in `required` that are not keys of `properties` are dropped, and an empty
    /// required list is left out entirely.
    pub fn object(properties: IndexMap<String, SchemaNode>, required: Vec<String>) -> Self {
        let required: Vec<String> = required
            .into_iter()
            .filter(|name| properties.contains_key(name))
            .collect();

        Self {
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Self::of_kind(SchemaKind::Object)
        }
    }

    /// The generic response envelope: `{ message: string }`
    pub fn message_envelope() -> Self {
        let mut properties = IndexMap::new();
        properties.insert("message".to_string(), SchemaNode::string());
        Self::object(properties, Vec::new())
    }
}
