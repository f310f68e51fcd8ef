//! Request serialization for the wire protocols the services speak.

pub mod json;
pub mod query;
pub mod rest;
pub mod xml;

use super::errors::{TransportError, TransportResult};
use super::http::HttpRequest;
use super::signing::uri_encode;
use crate::model::{OperationDef, ParamShape, Protocol, ServiceModel};
use crate::params::{Document, FlatParams};
use url::Url;

/// Optional shape lookup: serializers fall back to generic layouts when a
/// service has no model installed.
#[derive(Debug, Clone, Copy)]
pub struct Shapes<'a>(Option<&'a ServiceModel>);

impl<'a> Shapes<'a> {
    pub fn new(model: Option<&'a ServiceModel>) -> Self {
        Shapes(model)
    }

    pub fn get(&self, name: &str) -> Option<&'a ParamShape> {
        self.0.and_then(|model| model.shape(name))
    }
}

/// Protocol settings for one request, taken from the service model or from
/// the built-in defaults of a service without one.
#[derive(Debug, Clone, Copy)]
pub struct Wire<'a> {
    pub protocol: Protocol,
    pub api_version: &'a str,
    pub target_prefix: Option<&'a str>,
    pub json_version: &'a str,
}

impl<'a> Wire<'a> {
    pub fn from_model(model: &'a ServiceModel, fallback_json_version: &'a str) -> Self {
        Wire {
            protocol: model.metadata.protocol,
            api_version: model.metadata.api_version.as_str(),
            target_prefix: model.metadata.target_prefix.as_deref(),
            json_version: model
                .metadata
                .json_version
                .as_deref()
                .unwrap_or(fallback_json_version),
        }
    }
}

/// Builds an unsigned request for `action` carrying `doc`.
///
/// `schema` supplies the model and operation; the rest protocols cannot be
/// built without one.
pub fn build_request(
    endpoint: &Url,
    wire: &Wire<'_>,
    action: &str,
    doc: &Document,
    schema: Option<(&ServiceModel, &OperationDef)>,
) -> TransportResult<HttpRequest> {
    let model = schema.map(|(model, _)| model);
    let input = schema.and_then(|(model, operation)| model.input_shape(operation));
    let shapes = Shapes::new(model);

    match wire.protocol {
        Protocol::Query | Protocol::Ec2 => {
            let ec2 = wire.protocol == Protocol::Ec2;
            let params = query::serialize(action, wire.api_version, doc, input, shapes, ec2);
            Ok(form_request(endpoint, &params))
        }
        Protocol::Json => {
            let body = json::to_json(doc, input, shapes);
            let mut request = HttpRequest::new("POST", endpoint.clone())
                .header(
                    "content-type",
                    format!("application/x-amz-json-{}", wire.json_version),
                )
                .body(serde_json::to_string(&body)?);
            if let Some(prefix) = wire.target_prefix {
                request = request.header("x-amz-target", format!("{}.{}", prefix, action));
            }
            Ok(request)
        }
        Protocol::RestJson | Protocol::RestXml => {
            let (model, operation) = schema.ok_or_else(|| {
                TransportError::invalid_request(format!(
                    "the {} protocol requires a service model",
                    wire.protocol.as_str()
                ))
            })?;
            rest::build_request(endpoint, wire.protocol, model, operation, doc)
        }
    }
}

/// Builds a query-protocol request from flat keys sent as typed.
pub fn build_flat_request(endpoint: &Url, wire: &Wire<'_>, action: &str, flat: &FlatParams) -> HttpRequest {
    form_request(endpoint, &query::serialize_flat(action, wire.api_version, flat))
}

fn form_request(endpoint: &Url, params: &query::FormParams) -> HttpRequest {
    let pairs: Vec<(String, String)> = params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    HttpRequest::new("POST", endpoint.clone())
        .header(
            "content-type",
            "application/x-www-form-urlencoded; charset=utf-8",
        )
        .body(encode_query(&pairs))
}

/// `k=v&...` with both sides percent-encoded, in the given order.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
