use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Nested request arguments built from dot-notation parameters.
///
/// The decoder only produces `String` leaves; the typed scalar variants are
/// filled in by coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Mapping(BTreeMap<String, Document>),
    Sequence(Vec<Document>),
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Document {
    /// An uncommitted node: an empty mapping that may still turn into a sequence.
    pub fn empty() -> Self {
        Document::Mapping(BTreeMap::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Document::String(value.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Document::Mapping(_) => "mapping",
            Document::Sequence(_) => "sequence",
            Document::String(_) => "string",
            Document::Integer(_) => "integer",
            Document::Float(_) => "float",
            Document::Boolean(_) => "boolean",
        }
    }

    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, Document::Mapping(map) if map.is_empty())
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Document::Mapping(_) | Document::Sequence(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Text form of a scalar leaf as it goes on a query string or into a header.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Document::String(s) => Some(s.clone()),
            Document::Integer(i) => Some(i.to_string()),
            Document::Float(f) => Some(f.to_string()),
            Document::Boolean(b) => Some(b.to_string()),
            Document::Mapping(_) | Document::Sequence(_) => None,
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        match doc {
            Document::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Map<String, Value>>(),
            ),
            Document::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Document::String(s) => Value::String(s),
            Document::Integer(i) => Value::Number(i.into()),
            Document::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Document::Boolean(b) => Value::Bool(b),
        }
    }
}
