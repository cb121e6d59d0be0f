//! Content documents: the JSON-shaped values edited by the CMS.
//!
//! A `Content` is a recursive value: scalar, ordered mapping, or ordered
//! sequence. Containers sit behind `Arc`, so cloning a document is O(1) and
//! a path write only copies the containers it walks through (see
//! [`crate::store`]). Any previously held document stays valid and unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Ordered property map of an object value.
pub type ContentMap = IndexMap<String, Content>;

/// One node of a content document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Content {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Arc<Vec<Content>>),
    Object(Arc<ContentMap>),
}

impl Content {
    /// An empty object `{}`.
    pub fn object() -> Self {
        Content::Object(Arc::new(ContentMap::new()))
    }

    /// An empty array `[]`.
    pub fn array() -> Self {
        Content::Array(Arc::new(Vec::new()))
    }

    /// The empty string `""`, the default for every scalar field kind.
    pub fn empty_string() -> Self {
        Content::String(String::new())
    }

    pub fn from_map(map: ContentMap) -> Self {
        Content::Object(Arc::new(map))
    }

    pub fn from_items(items: Vec<Content>) -> Self {
        Content::Array(Arc::new(items))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Content::Null)
    }

    /// `true` for null, `""`, `[]` and `{}`.
    pub fn is_empty_default(&self) -> bool {
        match self {
            Content::Null => true,
            Content::String(s) => s.is_empty(),
            Content::Array(items) => items.is_empty(),
            Content::Object(map) => map.is_empty(),
            Content::Bool(_) | Content::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Content]> {
        match self {
            Content::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ContentMap> {
        match self {
            Content::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Property lookup; `None` on missing key or non-object.
    pub fn get(&self, key: &str) -> Option<&Content> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Element lookup; `None` when out of range or not an array.
    pub fn get_index(&self, index: usize) -> Option<&Content> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Short name of the value's shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Null => "null",
            Content::Bool(_) => "bool",
            Content::Number(_) => "number",
            Content::String(_) => "string",
            Content::Array(_) => "array",
            Content::Object(_) => "object",
        }
    }

    /// Text shown in a leaf editor. Containers have no scalar text and
    /// render as `""`.
    pub fn to_display_string(&self) -> String {
        match self {
            Content::Null | Content::Array(_) | Content::Object(_) => String::new(),
            Content::Bool(b) => b.to_string(),
            Content::Number(n) => n.to_string(),
            Content::String(s) => s.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::String(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::String(s)
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Bool(b)
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Content::Null,
            serde_json::Value::Bool(b) => Content::Bool(b),
            serde_json::Value::Number(n) => Content::Number(n),
            serde_json::Value::String(s) => Content::String(s),
            serde_json::Value::Array(items) => {
                Content::from_items(items.into_iter().map(Content::from).collect())
            }
            serde_json::Value::Object(map) => Content::from_map(
                map.into_iter()
                    .map(|(k, v)| (k, Content::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Content> for serde_json::Value {
    fn from(content: &Content) -> Self {
        match content {
            Content::Null => serde_json::Value::Null,
            Content::Bool(b) => serde_json::Value::Bool(*b),
            Content::Number(n) => serde_json::Value::Number(n.clone()),
            Content::String(s) => serde_json::Value::String(s.clone()),
            Content::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Content::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Content::Null => serializer.serialize_unit(),
            Content::Bool(b) => serializer.serialize_bool(*b),
            Content::Number(n) => n.serialize(serializer),
            Content::String(s) => serializer.serialize_str(s),
            Content::Array(items) => serializer.collect_seq(items.iter()),
            Content::Object(map) => serializer.collect_map(map.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Content::from)
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
