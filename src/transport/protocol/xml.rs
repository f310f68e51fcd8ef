//! `rest-xml` request bodies.

use super::Shapes;
use crate::model::{MemberRef, ParamShape, ShapeKind};
use crate::params::Document;
use crate::transport::errors::{TransportError, TransportResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Cursor;

/// Serializes `doc` as an element named `root`. Structure members are
/// written in the order the shape declares them.
pub fn to_xml<'a>(
    root: &str,
    namespace: Option<&str>,
    doc: &Document,
    shape: Option<&'a ParamShape>,
    shapes: Shapes<'a>,
) -> TransportResult<String> {
    let mut body = XmlBody {
        writer: Writer::new(Cursor::new(Vec::new())),
        shapes,
    };
    body.element(root, namespace, doc, shape, None)?;
    String::from_utf8(body.writer.into_inner().into_inner()).map_err(TransportError::xml)
}

struct XmlBody<'a> {
    writer: Writer<Cursor<Vec<u8>>>,
    shapes: Shapes<'a>,
}

impl<'a> XmlBody<'a> {
    fn element(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        value: &Document,
        shape: Option<&'a ParamShape>,
        reference: Option<&'a MemberRef>,
    ) -> TransportResult<()> {
        match (value, shape) {
            (Document::Mapping(entries), Some(shape)) if shape.kind() == ShapeKind::Structure => {
                self.structure(name, namespace, entries, shape)
            }
            (Document::Mapping(entries), Some(shape)) if shape.kind() == ShapeKind::Map => {
                self.map(name, entries, shape, reference)
            }
            (Document::Sequence(items), Some(shape)) if shape.kind() == ShapeKind::List => {
                self.list(name, items, shape, reference)
            }
            (Document::Mapping(entries), _) => {
                self.start(BytesStart::new(name), namespace)?;
                for (key, value) in entries {
                    self.element(key, None, value, None, None)?;
                }
                self.end(name)
            }
            (Document::Sequence(items), _) => {
                self.start(BytesStart::new(name), namespace)?;
                for item in items {
                    self.element("member", None, item, None, None)?;
                }
                self.end(name)
            }
            (scalar, _) => {
                self.start(BytesStart::new(name), namespace)?;
                if let Some(text) = scalar.scalar_text() {
                    self.write(Event::Text(BytesText::new(&text)))?;
                }
                self.end(name)
            }
        }
    }

    fn structure(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        entries: &BTreeMap<String, Document>,
        shape: &'a ParamShape,
    ) -> TransportResult<()> {
        let mut start = BytesStart::new(name);
        for (member_name, member) in shape.members.iter().filter(|(_, m)| m.xml_attribute) {
            if let Some(text) = entries.get(member_name).and_then(Document::scalar_text) {
                start.push_attribute((wire_name(member_name, member), text.as_str()));
            }
        }
        self.start(start, namespace)?;

        for (member_name, member) in shape.members.iter().filter(|(_, m)| !m.xml_attribute) {
            if let Some(value) = entries.get(member_name) {
                let member_ns = member.xml_namespace.as_ref().and_then(|ns| ns.uri.as_deref());
                let member_shape = self.shapes.get(&member.shape);
                self.element(wire_name(member_name, member), member_ns, value, member_shape, Some(member))?;
            }
        }
        for (key, value) in entries.iter().filter(|(key, _)| !shape.members.contains_key(*key)) {
            self.element(key, None, value, None, None)?;
        }

        self.end(name)
    }

    fn list(
        &mut self,
        name: &str,
        items: &[Document],
        shape: &'a ParamShape,
        reference: Option<&'a MemberRef>,
    ) -> TransportResult<()> {
        let element = shape.member.as_ref();
        let element_shape = element.and_then(|m| self.shapes.get(&m.shape));
        let element_name = element.and_then(|m| m.location_name.as_deref());

        if shape.flattened || reference.is_some_and(|r| r.flattened) {
            let element_name = element_name.unwrap_or(name);
            for item in items {
                self.element(element_name, None, item, element_shape, element)?;
            }
            return Ok(());
        }

        self.start(BytesStart::new(name), None)?;
        for item in items {
            self.element(element_name.unwrap_or("member"), None, item, element_shape, element)?;
        }
        self.end(name)
    }

    fn map(
        &mut self,
        name: &str,
        entries: &BTreeMap<String, Document>,
        shape: &'a ParamShape,
        reference: Option<&'a MemberRef>,
    ) -> TransportResult<()> {
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
        let flattened = shape.flattened || reference.is_some_and(|r| r.flattened);

        if !flattened {
            self.start(BytesStart::new(name), None)?;
        }
        let entry_name = if flattened { name } else { "entry" };
        for (key, value) in entries {
            self.start(BytesStart::new(entry_name), None)?;
            self.element(key_name, None, &Document::string(key.as_str()), None, None)?;
            self.element(value_name, None, value, value_shape, value_ref)?;
            self.end(entry_name)?;
        }
        if !flattened {
            self.end(name)?;
        }
        Ok(())
    }

    fn start(&mut self, mut start: BytesStart<'_>, namespace: Option<&str>) -> TransportResult<()> {
        if let Some(uri) = namespace {
            start.push_attribute(("xmlns", uri));
        }
        self.write(Event::Start(start))
    }

    fn end(&mut self, name: &str) -> TransportResult<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn write(&mut self, event: Event<'_>) -> TransportResult<()> {
        self.writer.write_event(event).map_err(TransportError::xml)
    }
}

fn wire_name<'m>(name: &'m str, member: &'m MemberRef) -> &'m str {
    member.location_name.as_deref().unwrap_or(name)
}
