//! Response post-processing: service errors, metadata stripping and pretty
//! printing.
//!
//! When the operation's output shape is known it decides which elements are
//! lists and how leaves are typed; otherwise the layout is guessed from the
//! document itself.

use super::errors::{TransportError, TransportResult};
use super::http::HttpResponse;
use super::protocol::Shapes;
use super::timestamp;
use crate::model::{MemberRef, OperationDef, ParamShape, ServiceModel, ShapeKind};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Number, Value};
use std::io::Cursor;
use tracing::debug;

/// The called operation and the model it came from.
pub type Schema<'a> = Option<(&'a ServiceModel, &'a OperationDef)>;

const RESPONSE_METADATA: &str = "ResponseMetadata";

/// Turns a non-2xx response into [`TransportError::Service`].
pub fn check_status(response: &HttpResponse) -> TransportResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let (code, message) = error_details(response);
    debug!(status = response.status, code = %code, "service returned an error");
    Err(TransportError::Service {
        status: response.status,
        code,
        message,
    })
}

fn error_details(response: &HttpResponse) -> (String, String) {
    let body = response.body.trim();
    let parsed = if body.starts_with('<') {
        xml_error(body)
    } else if body.starts_with('{') {
        json_error(body)
    } else {
        None
    };

    let header_code = response
        .headers
        .get("x-amzn-errortype")
        .map(|value| value.split(':').next().unwrap_or(value).to_string());

    match parsed {
        Some((code, message)) => (code.or(header_code).unwrap_or_else(|| status_code(response)), message),
        None => (
            header_code.unwrap_or_else(|| status_code(response)),
            body.to_string(),
        ),
    }
}

fn status_code(response: &HttpResponse) -> String {
    format!("HTTP{}", response.status)
}

fn json_error(body: &str) -> Option<(Option<String>, String)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    let code = ["__type", "code", "Code"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(|code| code.rsplit('#').next().unwrap_or(code).to_string());
    let message = ["message", "Message", "errorMessage"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    Some((code, message))
}

/// First `<Code>` and `<Message>` anywhere in the document.
fn xml_error(body: &str) -> Option<(Option<String>, String)> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut current = String::new();
    let mut code = None;
    let mut message = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().ok()?.into_owned();
                match current.as_str() {
                    "Code" if code.is_none() => code = Some(text),
                    "Message" if message.is_none() => message = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current.clear(),
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    if code.is_none() && message.is_none() {
        return None;
    }
    Some((code, message.unwrap_or_default()))
}

/// Re-indents a JSON response body. An empty body prints as `{}`.
pub fn render_json(body: &str, schema: Schema<'_>) -> TransportResult<String> {
    let value = if body.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(body)?
    };
    let value = strip_metadata(value);

    let value = match output_of(schema) {
        Some((output, shapes)) => match payload_of(output, shapes) {
            Some((name, payload)) => {
                let mut object = Map::new();
                object.insert(name.to_string(), shape_json(value, payload, shapes));
                Value::Object(object)
            }
            None => shape_json(value, output, shapes),
        },
        None => value,
    };
    pretty_json(value)
}

/// Converts an XML response body to JSON.
///
/// With an output shape the element named by the result wrapper (or the
/// root) is read as that shape. Without one, the `*Result` element's
/// contents are kept when there is one.
pub fn render_xml_as_json(body: &str, schema: Schema<'_>) -> TransportResult<String> {
    if body.trim().is_empty() {
        return pretty_json(Value::Object(Map::new()));
    }
    let root = parse_tree(body)?;

    if let Some((output, shapes)) = output_of(schema) {
        let wrapper = schema
            .and_then(|(_, operation)| operation.output.as_ref())
            .and_then(|output| output.result_wrapper.as_deref());
        let node = match wrapper {
            Some(wrapper) => match root.child(wrapper) {
                Some(node) => node,
                None => return pretty_json(Value::Object(Map::new())),
            },
            None => &root,
        };

        let value = match payload_of(output, shapes) {
            Some((name, payload)) => {
                let mut object = Map::new();
                object.insert(name.to_string(), node.shaped(payload, shapes));
                Value::Object(object)
            }
            None => node.shaped(output, shapes),
        };
        return pretty_json(value);
    }

    let mut value = match root.to_value() {
        Value::Object(object) => object,
        other => return pretty_json(other),
    };
    value.remove(RESPONSE_METADATA);

    let result_key = value.keys().find(|key| key.ends_with("Result")).cloned();
    let value = match result_key.and_then(|key| value.remove(&key)) {
        Some(result) => result,
        None => Value::Object(value),
    };
    pretty_json(value)
}

/// Re-indents an XML response body.
pub fn render_xml(body: &str) -> TransportResult<String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

    loop {
        match reader.read_event().map_err(TransportError::xml)? {
            Event::Eof => break,
            event => writer.write_event(event).map_err(TransportError::xml)?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(TransportError::xml)
}

fn strip_metadata(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.remove(RESPONSE_METADATA);
            Value::Object(object)
        }
        other => other,
    }
}

fn pretty_json(value: Value) -> TransportResult<String> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn output_of<'a>(schema: Schema<'a>) -> Option<(&'a ParamShape, Shapes<'a>)> {
    let (model, operation) = schema?;
    let output = model.output_shape(operation)?;
    Some((output, Shapes::new(Some(model))))
}

/// The structure member that makes up the whole body, if the output has one.
fn payload_of<'a>(output: &'a ParamShape, shapes: Shapes<'a>) -> Option<(&'a str, &'a ParamShape)> {
    let name = output.payload.as_deref()?;
    let shape = shapes.get(&output.members.get(name)?.shape)?;
    (shape.kind() == ShapeKind::Structure).then_some((name, shape))
}

fn wire_name<'m>(name: &'m str, member: &'m MemberRef) -> &'m str {
    member.location_name.as_deref().unwrap_or(name)
}

/// Renames members back to their canonical names and prints timestamps as
/// strings. Keys the shape does not know are kept as they are.
fn shape_json<'a>(value: Value, shape: &'a ParamShape, shapes: Shapes<'a>) -> Value {
    match (value, shape.kind()) {
        (Value::Object(object), ShapeKind::Structure) => {
            let mut shaped = Map::new();
            for (key, value) in object {
                let member = shape
                    .members
                    .iter()
                    .find(|(name, member)| wire_name(name, member) == key);
                match member {
                    Some((name, member)) => {
                        let value = match shapes.get(&member.shape) {
                            Some(member_shape) => shape_json(value, member_shape, shapes),
                            None => value,
                        };
                        shaped.insert(name.clone(), value);
                    }
                    None => {
                        shaped.insert(key, value);
                    }
                }
            }
            Value::Object(shaped)
        }
        (Value::Object(object), ShapeKind::Map) => {
            let Some(value_shape) = shape.value.as_ref().and_then(|v| shapes.get(&v.shape)) else {
                return Value::Object(object);
            };
            Value::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, shape_json(value, value_shape, shapes)))
                    .collect(),
            )
        }
        (Value::Array(items), ShapeKind::List) => {
            let Some(element) = shape.member.as_ref().and_then(|m| shapes.get(&m.shape)) else {
                return Value::Array(items);
            };
            Value::Array(
                items
                    .into_iter()
                    .map(|item| shape_json(item, element, shapes))
                    .collect(),
            )
        }
        (value, ShapeKind::Timestamp) => timestamp::display(&value)
            .map(Value::String)
            .unwrap_or(value),
        (value, _) => value,
    }
}

/// Typed leaf for XML text.
fn xml_scalar(text: &str, kind: ShapeKind) -> Value {
    let trimmed = text.trim();
    let typed = match kind {
        ShapeKind::Integer => trimmed.parse::<i64>().ok().map(Value::from),
        ShapeKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ShapeKind::Boolean => match trimmed {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ShapeKind::Timestamp => timestamp::display(&Value::String(trimmed.to_string())).map(Value::String),
        _ => None,
    };
    typed.unwrap_or_else(|| Value::String(text.to_string()))
}

#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Leaves become strings. Elements whose children are all `member` or
    /// `item` become arrays, as do names repeated among siblings.
    fn to_value(&self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text.clone());
        }

        let is_list = self
            .children
            .iter()
            .all(|child| child.name == "member" || child.name == "item");
        if is_list {
            return Value::Array(self.children.iter().map(XmlNode::to_value).collect());
        }

        let mut object = Map::new();
        for child in &self.children {
            let value = child.to_value();
            if !self.repeats(&child.name) {
                object.insert(child.name.clone(), value);
                continue;
            }
            let slot = object
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(value);
            }
        }
        Value::Object(object)
    }

    fn repeats(&self, name: &str) -> bool {
        self.children.iter().filter(|child| child.name == name).count() > 1
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    fn shaped<'a>(&self, shape: &'a ParamShape, shapes: Shapes<'a>) -> Value {
        match shape.kind() {
            ShapeKind::Structure => self.structure(shape, shapes),
            ShapeKind::List => {
                let element = shape.member.as_ref();
                let element_name = element.and_then(|m| m.location_name.as_deref());
                Value::Array(
                    self.children
                        .iter()
                        .filter(|child| match element_name {
                            Some(name) => child.name == name,
                            None => child.name == "member" || child.name == "item",
                        })
                        .map(|child| child.element(element, shapes))
                        .collect(),
                )
            }
            ShapeKind::Map => map_entries(self.children.iter().filter(|c| c.name == "entry"), shape, shapes),
            kind => xml_scalar(&self.text, kind),
        }
    }

    /// Members absent from the document are left out. Unknown children are
    /// converted without a shape.
    fn structure<'a>(&self, shape: &'a ParamShape, shapes: Shapes<'a>) -> Value {
        let mut object = Map::new();
        let mut known = Vec::new();

        for (name, member) in &shape.members {
            if member.xml_attribute || !member.in_body() {
                continue;
            }
            let wire = wire_name(name, member);
            known.push(wire);
            let member_shape = shapes.get(&member.shape);

            match member_shape {
                Some(member_shape) if member.flattened || member_shape.flattened => {
                    let nodes = self.children.iter().filter(|child| child.name == wire);
                    let value = match member_shape.kind() {
                        ShapeKind::Map => map_entries(nodes, member_shape, shapes),
                        _ => {
                            let element = member_shape.member.as_ref();
                            Value::Array(nodes.map(|node| node.element(element, shapes)).collect())
                        }
                    };
                    let present = match &value {
                        Value::Array(items) => !items.is_empty(),
                        Value::Object(entries) => !entries.is_empty(),
                        _ => true,
                    };
                    if present {
                        object.insert(name.clone(), value);
                    }
                }
                _ => {
                    if let Some(child) = self.child(wire) {
                        object.insert(name.clone(), child.element(Some(member), shapes));
                    }
                }
            }
        }

        let unknown = self
            .children
            .iter()
            .filter(|child| !known.contains(&child.name.as_str()));
        for child in unknown {
            let value = child.to_value();
            if !self.repeats(&child.name) {
                object.insert(child.name.clone(), value);
                continue;
            }
            let slot = object
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(value);
            }
        }
        Value::Object(object)
    }

    fn element<'a>(&self, reference: Option<&'a MemberRef>, shapes: Shapes<'a>) -> Value {
        match reference.and_then(|r| shapes.get(&r.shape)) {
            Some(shape) => self.shaped(shape, shapes),
            None => self.to_value(),
        }
    }
}

fn map_entries<'n, 'a>(
    entries: impl Iterator<Item = &'n XmlNode>,
    shape: &'a ParamShape,
    shapes: Shapes<'a>,
) -> Value {
    let key_name = shape
        .key
        .as_ref()
        .and_then(|k| k.location_name.as_deref())
        .unwrap_or("key");
    let value_name = shape
        .value
        .as_ref()
        .and_then(|v| v.location_name.as_deref())
        .unwrap_or("value");

    let mut object = Map::new();
    for entry in entries {
        let Some(key) = entry.child(key_name) else {
            continue;
        };
        let value = entry
            .child(value_name)
            .map(|value| value.element(shape.value.as_ref(), shapes))
            .unwrap_or(Value::Null);
        object.insert(key.text.clone(), value);
    }
    Value::Object(object)
}

fn parse_tree(body: &str) -> TransportResult<XmlNode> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

    loop {
        match reader.read_event().map_err(TransportError::xml)? {
            Event::Start(e) => stack.push(XmlNode {
                name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ..XmlNode::default()
            }),
            Event::Empty(e) => {
                let node = XmlNode {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..XmlNode::default()
                };
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(TransportError::xml)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| TransportError::xml("unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Err(TransportError::xml("unbalanced closing tag")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut document = stack
        .pop()
        .ok_or_else(|| TransportError::xml("empty document"))?;
    if !stack.is_empty() {
        return Err(TransportError::xml("unclosed element"));
    }
    document
        .children
        .pop()
        .ok_or_else(|| TransportError::xml("no root element"))
}
