//! Schema-driven coercion of decoded parameters.

use super::document::Document;
use super::errors::{ParamsError, ParamsResult};
use crate::model::shape::{ParamShape, ShapeKind, ShapeResolver};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Converts string leaves of `doc` into the types declared by `shape`.
///
/// Members are matched by canonical or alternate name and stored under the
/// canonical name. Keys the schema does not know are kept as they are.
pub fn coerce<R>(doc: Document, shape: &ParamShape, shapes: &R) -> ParamsResult<Document>
where
    R: ShapeResolver + ?Sized,
{
    coerce_at(doc, shape, shapes, "")
}

fn coerce_at<R>(doc: Document, shape: &ParamShape, shapes: &R, path: &str) -> ParamsResult<Document>
where
    R: ShapeResolver + ?Sized,
{
    match shape.kind() {
        ShapeKind::List => {
            let items = match doc {
                Document::Sequence(items) => items,
                other => return Err(ParamsError::shape_mismatch(path, "sequence", other.kind_name())),
            };
            let Some(element) = shape.member.as_ref().and_then(|m| resolve(shapes, &m.shape)) else {
                return Ok(Document::Sequence(items));
            };
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| coerce_at(item, element, shapes, &child_path(path, &(i + 1).to_string())))
                .collect::<ParamsResult<Vec<_>>>()
                .map(Document::Sequence)
        }
        ShapeKind::Structure => {
            let entries = match doc {
                Document::Mapping(entries) => entries,
                other => return Err(ParamsError::shape_mismatch(path, "mapping", other.kind_name())),
            };
            let mut converted = BTreeMap::new();
            for (key, value) in entries {
                let entry_path = child_path(path, &key);
                match shape.find_member(&key) {
                    Some((name, member)) => {
                        let value = match resolve(shapes, &member.shape) {
                            Some(member_shape) => coerce_at(value, member_shape, shapes, &entry_path)?,
                            None => value,
                        };
                        converted.insert(name.to_string(), value);
                    }
                    None => {
                        debug!(path = %entry_path, "passing through parameter unknown to the schema");
                        converted.insert(key, value);
                    }
                }
            }
            Ok(Document::Mapping(converted))
        }
        ShapeKind::Map => {
            let entries = match doc {
                Document::Mapping(entries) => entries,
                other => return Err(ParamsError::shape_mismatch(path, "mapping", other.kind_name())),
            };
            let Some(value_shape) = shape.value.as_ref().and_then(|v| resolve(shapes, &v.shape)) else {
                return Ok(Document::Mapping(entries));
            };
            entries
                .into_iter()
                .map(|(key, value)| {
                    let entry_path = child_path(path, &key);
                    coerce_at(value, value_shape, shapes, &entry_path).map(|v| (key, v))
                })
                .collect::<ParamsResult<BTreeMap<_, _>>>()
                .map(Document::Mapping)
        }
        ShapeKind::String => match doc {
            Document::String(_) => Ok(doc),
            other if other.is_scalar() => Ok(Document::String(other.scalar_text().unwrap_or_default())),
            other => Err(ParamsError::shape_mismatch(path, "string", other.kind_name())),
        },
        ShapeKind::Integer => match doc {
            Document::String(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Document::Integer)
                .map_err(|_| ParamsError::invalid_scalar(path, "integer", raw)),
            Document::Integer(_) => Ok(doc),
            other => Err(ParamsError::shape_mismatch(path, "integer", other.kind_name())),
        },
        ShapeKind::Float => match doc {
            Document::String(raw) => raw
                .trim()
                .parse::<f64>()
                .map(Document::Float)
                .map_err(|_| ParamsError::invalid_scalar(path, "float", raw)),
            Document::Integer(i) => Ok(Document::Float(i as f64)),
            Document::Float(_) => Ok(doc),
            other => Err(ParamsError::shape_mismatch(path, "float", other.kind_name())),
        },
        ShapeKind::Boolean => match doc {
            // Only a literal "false" is false; "0" and "" are true.
            Document::String(raw) => Ok(Document::Boolean(!raw.eq_ignore_ascii_case("false"))),
            Document::Boolean(_) => Ok(doc),
            other => Err(ParamsError::shape_mismatch(path, "boolean", other.kind_name())),
        },
        ShapeKind::Timestamp | ShapeKind::Blob | ShapeKind::Other => Ok(doc),
    }
}

fn resolve<'a, R>(shapes: &'a R, name: &str) -> Option<&'a ParamShape>
where
    R: ShapeResolver + ?Sized,
{
    let shape = shapes.resolve(name);
    if shape.is_none() {
        warn!(shape = name, "shape missing from service model, value left as is");
    }
    shape
}

fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::decoder::decode;
    use crate::params::flat::FlatParams;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    struct Shapes(HashMap<String, ParamShape>);

    impl Shapes {
        fn from_json(value: Value) -> Self {
            let defs: HashMap<String, ParamShape> = serde_json::from_value(value).unwrap();
            Shapes(
                defs.into_iter()
                    .map(|(name, mut shape)| {
                        shape.name = name.clone();
                        (name, shape)
                    })
                    .collect(),
            )
        }

        fn get(&self, name: &str) -> &ParamShape {
            &self.0[name]
        }
    }

    impl ShapeResolver for Shapes {
        fn resolve(&self, name: &str) -> Option<&ParamShape> {
            self.0.get(name)
        }
    }

    fn shapes() -> Shapes {
        Shapes::from_json(json!({
            "Request": {
                "type": "structure",
                "members": {
                    "Count": {"shape": "Integer"},
                    "Flag": {"shape": "Boolean"},
                    "Ratio": {"shape": "Double"},
                    "Name": {"shape": "String"},
                    "Filters": {"shape": "FilterList", "locationName": "Filter"},
                    "Tags": {"shape": "TagMap"},
                    "Since": {"shape": "Timestamp"}
                }
            },
            "FilterList": {"type": "list", "member": {"shape": "Filter", "locationName": "item"}},
            "Filter": {
                "type": "structure",
                "members": {
                    "Name": {"shape": "String"},
                    "Values": {"shape": "ValueList", "locationName": "Value"}
                }
            },
            "ValueList": {"type": "list", "member": {"shape": "String"}},
            "TagMap": {"type": "map", "key": {"shape": "String"}, "value": {"shape": "Integer"}},
            "Integer": {"type": "integer"},
            "Boolean": {"type": "boolean"},
            "Double": {"type": "double"},
            "String": {"type": "string"},
            "Timestamp": {"type": "timestamp"}
        }))
    }

    fn run(pairs: &[(&str, &str)]) -> ParamsResult<Value> {
        let shapes = shapes();
        let flat: FlatParams = pairs.iter().copied().collect();
        let doc = decode(&flat)?;
        coerce(doc, shapes.get("Request"), &shapes).map(Value::from)
    }

    #[test]
    fn test_integer_member() {
        assert_eq!(run(&[("Count", "42")]).unwrap(), json!({"Count": 42}));
    }

    #[test]
    fn test_integer_member_rejects_garbage() {
        let err = run(&[("Count", "forty")]).unwrap_err();
        assert_eq!(err, ParamsError::invalid_scalar("Count", "integer", "forty"));
    }

    #[test]
    fn test_boolean_rule_is_asymmetric() {
        assert_eq!(run(&[("Flag", "false")]).unwrap(), json!({"Flag": false}));
        assert_eq!(run(&[("Flag", "FALSE")]).unwrap(), json!({"Flag": false}));
        assert_eq!(run(&[("Flag", "0")]).unwrap(), json!({"Flag": true}));
        assert_eq!(run(&[("Flag", "")]).unwrap(), json!({"Flag": true}));
        assert_eq!(run(&[("Flag", "no")]).unwrap(), json!({"Flag": true}));
    }

    #[test]
    fn test_float_member() {
        assert_eq!(run(&[("Ratio", "2.5")]).unwrap(), json!({"Ratio": 2.5}));
        assert!(matches!(
            run(&[("Ratio", "x")]).unwrap_err(),
            ParamsError::InvalidScalar { .. }
        ));
    }

    #[test]
    fn test_string_member_stays_string() {
        assert_eq!(run(&[("Name", "007")]).unwrap(), json!({"Name": "007"}));
    }

    #[test]
    fn test_unknown_member_passes_through() {
        assert_eq!(
            run(&[("Mystery.1", "7"), ("Count", "1")]).unwrap(),
            json!({"Count": 1, "Mystery": ["7"]})
        );
    }

    #[test]
    fn test_alternate_name_maps_to_canonical() {
        assert_eq!(
            run(&[
                ("Filter.1.Name", "instance-state-name"),
                ("Filter.1.Value.1", "running"),
            ])
            .unwrap(),
            json!({"Filters": [{"Name": "instance-state-name", "Values": ["running"]}]})
        );
    }

    #[test]
    fn test_list_member_requires_sequence() {
        let err = run(&[("Filters", "oops")]).unwrap_err();
        assert_eq!(
            err,
            ParamsError::shape_mismatch("Filters", "sequence", "string")
        );
    }

    #[test]
    fn test_structure_requires_mapping() {
        let err = run(&[("Filters.1", "oops")]).unwrap_err();
        assert_eq!(
            err,
            ParamsError::shape_mismatch("Filters.1", "mapping", "string")
        );
    }

    #[test]
    fn test_scalar_rejects_container() {
        let err = run(&[("Count.1", "5")]).unwrap_err();
        assert_eq!(err, ParamsError::shape_mismatch("Count", "integer", "sequence"));
    }

    #[test]
    fn test_map_values_follow_value_shape() {
        assert_eq!(
            run(&[("Tags.cpu", "4"), ("Tags.mem", "16")]).unwrap(),
            json!({"Tags": {"cpu": 4, "mem": 16}})
        );
    }

    #[test]
    fn test_other_kinds_pass_through() {
        assert_eq!(
            run(&[("Since", "2024-01-01T00:00:00Z")]).unwrap(),
            json!({"Since": "2024-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn test_typed_leaves_are_accepted() {
        let shapes = shapes();
        let mut entries = BTreeMap::new();
        entries.insert("Count".to_string(), Document::Integer(3));
        entries.insert("Flag".to_string(), Document::Boolean(false));
        entries.insert("Name".to_string(), Document::Integer(12));
        let doc = coerce(Document::Mapping(entries), shapes.get("Request"), &shapes).unwrap();

        assert_eq!(
            Value::from(doc),
            json!({"Count": 3, "Flag": false, "Name": "12"})
        );
    }
}
