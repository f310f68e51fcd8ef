//! `query` and `ec2` protocol serialization: nested arguments flattened back
//! into dotted form fields.

use super::Shapes;
use crate::model::{MemberRef, ParamShape, ShapeKind};
use crate::params::{Document, FlatParams};
use std::collections::BTreeMap;

pub type FormParams = BTreeMap<String, String>;

/// Serializes `doc` for `action`. `input` is the operation's input shape when
/// a model is available; without it lists use the non-flattened `member`
/// layout (`query`) or plain indices (`ec2`).
pub fn serialize<'a>(
    action: &str,
    version: &str,
    doc: &Document,
    input: Option<&'a ParamShape>,
    shapes: Shapes<'a>,
    ec2: bool,
) -> FormParams {
    let mut writer = QueryWriter {
        shapes,
        ec2,
        params: FormParams::new(),
    };
    writer.write("", doc, input, None);
    writer.params.insert("Action".to_string(), action.to_string());
    writer.params.insert("Version".to_string(), version.to_string());
    writer.params
}

/// Legacy clients put their dotted keys on the wire as typed.
pub fn serialize_flat(action: &str, version: &str, flat: &FlatParams) -> FormParams {
    let mut params: FormParams = flat
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.insert("Action".to_string(), action.to_string());
    params.insert("Version".to_string(), version.to_string());
    params
}

struct QueryWriter<'a> {
    shapes: Shapes<'a>,
    ec2: bool,
    params: FormParams,
}

impl<'a> QueryWriter<'a> {
    fn write(
        &mut self,
        prefix: &str,
        value: &Document,
        shape: Option<&'a ParamShape>,
        reference: Option<&'a MemberRef>,
    ) {
        match (value, shape.map(ParamShape::kind)) {
            (Document::Mapping(entries), Some(ShapeKind::Structure)) => {
                if let Some(shape) = shape {
                    self.write_structure(prefix, entries, shape);
                }
            }
            (Document::Mapping(entries), Some(ShapeKind::Map)) => {
                if let Some(shape) = shape {
                    self.write_map(prefix, entries, shape, reference);
                }
            }
            (Document::Sequence(items), Some(ShapeKind::List)) => {
                if let Some(shape) = shape {
                    self.write_list(prefix, items, shape, reference);
                }
            }
            (Document::Mapping(entries), _) => {
                for (key, value) in entries {
                    self.write(&join(prefix, key), value, None, None);
                }
            }
            (Document::Sequence(items), _) => {
                let list_prefix = if self.ec2 {
                    prefix.to_string()
                } else {
                    join(prefix, "member")
                };
                for (i, item) in items.iter().enumerate() {
                    self.write(&join(&list_prefix, &(i + 1).to_string()), item, None, None);
                }
            }
            (scalar, _) => {
                if let Some(text) = scalar.scalar_text() {
                    self.params.insert(prefix.to_string(), text);
                }
            }
        }
    }

    fn write_structure(
        &mut self,
        prefix: &str,
        entries: &BTreeMap<String, Document>,
        shape: &'a ParamShape,
    ) {
        for (key, value) in entries {
            match shape.members.get(key) {
                Some(member) => {
                    let name = self.member_name(key, member);
                    let member_shape = self.shapes.get(&member.shape);
                    self.write(&join(prefix, &name), value, member_shape, Some(member));
                }
                None => self.write(&join(prefix, key), value, None, None),
            }
        }
    }

    fn write_list(
        &mut self,
        prefix: &str,
        items: &[Document],
        shape: &'a ParamShape,
        reference: Option<&'a MemberRef>,
    ) {
        let element = shape.member.as_ref();
        let element_shape = element.and_then(|m| self.shapes.get(&m.shape));

        if items.is_empty() {
            if !self.ec2 {
                self.params.insert(prefix.to_string(), String::new());
            }
            return;
        }

        let flattened = shape.flattened || reference.is_some_and(|r| r.flattened);
        let list_prefix = if self.ec2 {
            prefix.to_string()
        } else if flattened {
            match element.and_then(|m| m.location_name.as_deref()) {
                Some(name) => replace_last_segment(prefix, name),
                None => prefix.to_string(),
            }
        } else {
            let name = element
                .and_then(|m| m.location_name.as_deref())
                .unwrap_or("member");
            join(prefix, name)
        };

        for (i, item) in items.iter().enumerate() {
            self.write(
                &join(&list_prefix, &(i + 1).to_string()),
                item,
                element_shape,
                element,
            );
        }
    }

    fn write_map(
        &mut self,
        prefix: &str,
        entries: &BTreeMap<String, Document>,
        shape: &'a ParamShape,
        reference: Option<&'a MemberRef>,
    ) {
        let flattened = shape.flattened || reference.is_some_and(|r| r.flattened);
        let entry_prefix = if flattened {
            prefix.to_string()
        } else {
            join(prefix, "entry")
        };
        let key_name = shape
            .key
            .as_ref()
            .and_then(|k| k.location_name.as_deref())
            .unwrap_or("key");
        let value_ref = shape.value.as_ref();
        let value_name = value_ref
            .and_then(|v| v.location_name.as_deref())
            .unwrap_or("value");
        let value_shape = value_ref.and_then(|v| self.shapes.get(&v.shape));

        for (i, (key, value)) in entries.iter().enumerate() {
            let base = join(&entry_prefix, &(i + 1).to_string());
            self.params.insert(join(&base, key_name), key.clone());
            self.write(&join(&base, value_name), value, value_shape, value_ref);
        }
    }

    fn member_name(&self, key: &str, member: &MemberRef) -> String {
        if self.ec2 {
            if let Some(name) = &member.query_name {
                return name.clone();
            }
            if let Some(name) = &member.location_name {
                return capitalize(name);
            }
            return key.to_string();
        }
        member
            .location_name
            .clone()
            .unwrap_or_else(|| key.to_string())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn replace_last_segment(prefix: &str, name: &str) -> String {
    match prefix.rsplit_once('.') {
        Some((head, _)) => format!("{}.{}", head, name),
        None => name.to_string(),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
