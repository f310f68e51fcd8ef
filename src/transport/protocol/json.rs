use super::Shapes;
use crate::model::{ParamShape, ShapeKind};
use crate::params::Document;
use crate::transport::timestamp;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

/// Converts coerced arguments to a JSON body, renaming members to their
/// serialization names. Timestamps go out as epoch seconds and blobs as
/// base64.
pub fn to_json<'a>(doc: &Document, shape: Option<&'a ParamShape>, shapes: Shapes<'a>) -> Value {
    match (doc, shape.map(ParamShape::kind)) {
        (Document::Mapping(entries), Some(ShapeKind::Structure)) => {
            let mut object = Map::new();
            for (key, value) in entries {
                let member = shape.and_then(|s| s.members.get(key));
                let name = member
                    .and_then(|m| m.location_name.clone())
                    .unwrap_or_else(|| key.clone());
                let member_shape = member.and_then(|m| shapes.get(&m.shape));
                object.insert(name, to_json(value, member_shape, shapes));
            }
            Value::Object(object)
        }
        (Document::Mapping(entries), Some(ShapeKind::Map)) => {
            let value_shape = shape
                .and_then(|s| s.value.as_ref())
                .and_then(|v| shapes.get(&v.shape));
            Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), to_json(value, value_shape, shapes)))
                    .collect(),
            )
        }
        (Document::Sequence(items), Some(ShapeKind::List)) => {
            let element = shape
                .and_then(|s| s.member.as_ref())
                .and_then(|m| shapes.get(&m.shape));
            Value::Array(items.iter().map(|item| to_json(item, element, shapes)).collect())
        }
        (Document::String(text), Some(ShapeKind::Timestamp)) => {
            timestamp::to_epoch(text).unwrap_or_else(|| Value::String(text.clone()))
        }
        (Document::String(text), Some(ShapeKind::Blob)) => Value::String(STANDARD.encode(text)),
        (other, _) => Value::from(other.clone()),
    }
}
