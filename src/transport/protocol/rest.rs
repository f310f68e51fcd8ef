//! `rest-json` and `rest-xml` requests: members are split between the URI,
//! the query string, headers and the body according to their location.

use super::json::to_json;
use super::xml::to_xml;
use super::{encode_query, Shapes};
use crate::model::{Location, MemberRef, OperationDef, ParamShape, Protocol, ServiceModel, ShapeKind};
use crate::params::Document;
use crate::transport::errors::{TransportError, TransportResult};
use crate::transport::http::HttpRequest;
use crate::transport::signing::{uri_encode, uri_encode_path};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use url::Url;

lazy_static! {
    static ref URI_LABEL: Regex = Regex::new(r"\{([^}+]+)(\+)?\}").unwrap();
}

#[derive(Debug, Default)]
struct Partitioned {
    labels: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: BTreeMap<String, Document>,
}

pub fn build_request(
    endpoint: &Url,
    protocol: Protocol,
    model: &ServiceModel,
    operation: &OperationDef,
    doc: &Document,
) -> TransportResult<HttpRequest> {
    let shapes = Shapes::new(Some(model));
    let input = model.input_shape(operation);
    let parts = partition(doc, input)?;

    let (path_template, static_query) = match operation.http.request_uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (operation.http.request_uri.as_str(), None),
    };
    let path = expand_uri(path_template, &parts.labels)?;

    let mut query: Vec<(String, String)> = static_query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();
    query.extend(parts.query.iter().cloned());

    let mut url = endpoint.clone();
    let base = endpoint.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", base, path));
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&encode_query(&query)));
    }

    debug!(method = %operation.http.method, path = %url.path(), "built rest request");

    let mut request = HttpRequest::new(operation.http.method.as_str(), url);
    for (name, value) in &parts.headers {
        request = request.header(name, value.as_str());
    }

    let Some(input) = input else {
        return Ok(request);
    };

    if let Some(payload) = &input.payload {
        let member = input.members.get(payload);
        return match (parts.body.get(payload), member) {
            (Some(value), Some(member)) => payload_body(request, protocol, payload, member, value, shapes),
            _ => Ok(request),
        };
    }

    let has_body_members = input.members.values().any(MemberRef::in_body);
    match protocol {
        Protocol::RestJson if has_body_members || !parts.body.is_empty() => {
            let body = to_json(&Document::Mapping(parts.body), Some(input), shapes);
            Ok(request
                .header("content-type", "application/json")
                .body(serde_json::to_string(&body)?))
        }
        Protocol::RestXml if !parts.body.is_empty() => {
            let root = operation
                .input
                .as_ref()
                .and_then(|r| r.location_name.as_deref())
                .unwrap_or(input.name.as_str());
            let namespace = operation
                .input
                .as_ref()
                .and_then(|r| r.xml_namespace.as_ref())
                .and_then(|ns| ns.uri.as_deref());
            let body = to_xml(root, namespace, &Document::Mapping(parts.body), Some(input), shapes)?;
            Ok(request.header("content-type", "application/xml").body(body))
        }
        _ => Ok(request),
    }
}

fn partition(doc: &Document, input: Option<&ParamShape>) -> TransportResult<Partitioned> {
    let mut parts = Partitioned::default();
    let Some(entries) = doc.as_mapping() else {
        return Err(TransportError::invalid_request(format!(
            "request arguments must be a mapping, found {}",
            doc.kind_name()
        )));
    };

    for (key, value) in entries {
        let Some(member) = input.and_then(|shape| shape.members.get(key)) else {
            parts.body.insert(key.clone(), value.clone());
            continue;
        };
        let name = member.location_name.clone().unwrap_or_else(|| key.clone());

        match member.location {
            Some(Location::Uri) => {
                parts.labels.insert(name, scalar(key, value)?);
            }
            Some(Location::Querystring) => match value {
                Document::Sequence(items) => {
                    for item in items {
                        parts.query.push((name.clone(), scalar(key, item)?));
                    }
                }
                Document::Mapping(entries) => {
                    for (k, v) in entries {
                        parts.query.push((k.clone(), scalar(key, v)?));
                    }
                }
                other => parts.query.push((name, scalar(key, other)?)),
            },
            Some(Location::Header) => parts.headers.push((name, scalar(key, value)?)),
            Some(Location::Headers) => {
                for (suffix, v) in value.as_mapping().into_iter().flatten() {
                    parts.headers.push((format!("{}{}", name, suffix), scalar(key, v)?));
                }
            }
            Some(Location::StatusCode) => {}
            None | Some(Location::Unknown) => {
                parts.body.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(parts)
}

fn payload_body(
    request: HttpRequest,
    protocol: Protocol,
    name: &str,
    member: &MemberRef,
    value: &Document,
    shapes: Shapes<'_>,
) -> TransportResult<HttpRequest> {
    let shape = shapes.get(&member.shape);
    if shape.map(ParamShape::kind) != Some(ShapeKind::Structure) {
        let text = value.scalar_text().unwrap_or_default();
        return Ok(request.body(text));
    }

    match protocol {
        Protocol::RestXml => {
            let root = member.location_name.as_deref().unwrap_or(name);
            let namespace = member.xml_namespace.as_ref().and_then(|ns| ns.uri.as_deref());
            let body = to_xml(root, namespace, value, shape, shapes)?;
            Ok(request.header("content-type", "application/xml").body(body))
        }
        _ => Ok(request
            .header("content-type", "application/json")
            .body(serde_json::to_string(&to_json(value, shape, shapes))?)),
    }
}

/// Substitutes `{Label}` and greedy `{Label+}` placeholders.
fn expand_uri(template: &str, labels: &HashMap<String, String>) -> TransportResult<String> {
    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;

    for captures in URI_LABEL.captures_iter(template) {
        let (Some(whole), Some(label)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = labels.get(label.as_str()).ok_or_else(|| {
            TransportError::invalid_request(format!(
                "Missing required URI parameter '{}'",
                label.as_str()
            ))
        })?;

        expanded.push_str(&template[last..whole.start()]);
        if captures.get(2).is_some() {
            expanded.push_str(&uri_encode_path(value));
        } else {
            expanded.push_str(&uri_encode(value));
        }
        last = whole.end();
    }
    expanded.push_str(&template[last..]);
    Ok(expanded)
}

fn scalar(key: &str, value: &Document) -> TransportResult<String> {
    value.scalar_text().ok_or_else(|| {
        TransportError::invalid_request(format!(
            "Parameter '{}' must be a single value, found {}",
            key,
            value.kind_name()
        ))
    })
}
