//! The execution path shared by every service program: rewrite, decode,
//! coerce, serialize, sign, send and render.

use crate::cli::CliError;
use crate::config::Settings;
use crate::model::{to_pascal_case, ModelError, OperationRegistry, Protocol, ServiceModel};
use crate::params::{coerce, coerce_heuristic, coerce_named_integers, decode, FlatParams};
use crate::services::{Mode, OutputFormat, ServiceConfig, WireDefaults};
use crate::transport::protocol::{build_flat_request, build_request, Wire};
use crate::transport::{response, ApiTransport, HttpRequest, SigV4Signer};
use chrono::Utc;
use tracing::{debug, info};

/// One command line: the action name and its `key value` parameters.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub action: String,
    pub params: FlatParams,
}

impl Invocation {
    pub fn new(action: impl Into<String>, params: FlatParams) -> Self {
        Invocation {
            action: action.into(),
            params,
        }
    }
}

/// An unsigned request plus what is needed to sign it and read its response.
#[derive(Debug)]
struct Prepared {
    request: HttpRequest,
    protocol: Protocol,
    signing_name: String,
    /// Model and operation name, when the request was built from a schema.
    schema: Option<(ServiceModel, String)>,
}

/// Runs one invocation against `service` and returns the rendered response.
pub async fn execute<T>(
    service: &ServiceConfig,
    settings: &Settings,
    invocation: Invocation,
    transport: &T,
) -> Result<String, CliError>
where
    T: ApiTransport + ?Sized,
{
    let Invocation { action, params } = invocation;
    let params = service
        .rewrites
        .iter()
        .fold(params, |params, rewrite| rewrite(params));
    debug!(program = service.program, action = %action, count = params.len(), "prepared parameters");

    let Prepared {
        mut request,
        protocol,
        signing_name,
        schema,
    } = prepare(service, settings, &action, &params)?;

    SigV4Signer::new(&settings.credentials, &settings.region, &signing_name)
        .sign(&mut request, Utc::now());

    info!(program = service.program, action = %action, protocol = protocol.as_str(), "calling service");
    let response = transport.send(request).await?;
    response::check_status(&response)?;

    let schema = schema
        .as_ref()
        .and_then(|(model, name)| model.operations.get(name).map(|operation| (model, operation)));
    let rendered = match (service.output, protocol) {
        (OutputFormat::Xml, _) => response::render_xml(&response.body)?,
        (OutputFormat::Json, Protocol::Json | Protocol::RestJson) => {
            response::render_json(&response.body, schema)?
        }
        (OutputFormat::Json, _) => response::render_xml_as_json(&response.body, schema)?,
    };
    Ok(rendered)
}

fn prepare(
    service: &ServiceConfig,
    settings: &Settings,
    action: &str,
    params: &FlatParams,
) -> Result<Prepared, CliError> {
    let endpoint = &settings.endpoint;

    match service.mode {
        Mode::LegacyFlat => {
            let defaults = required_defaults(service, settings)?;
            let request = build_flat_request(endpoint, &wire_of(&defaults), &to_pascal_case(action), params);
            Ok(Prepared::from_defaults(request, &defaults))
        }
        Mode::LegacyNamedIntegers(names) => {
            let defaults = required_defaults(service, settings)?;
            let doc = coerce_named_integers(decode(params)?, names)?;
            let request = build_request(endpoint, &wire_of(&defaults), &to_pascal_case(action), &doc, None)?;
            Ok(Prepared::from_defaults(request, &defaults))
        }
        Mode::Schema => match ServiceModel::find(&settings.models_dir, service.api)? {
            Some(model) => {
                let registry = OperationRegistry::new(&model);
                let operation = registry.lookup(action)?;
                let doc = decode(params)?;
                let doc = match model.input_shape(operation) {
                    Some(input) => coerce(doc, input, &model)?,
                    None => doc,
                };

                let json_version = service.fallback.map_or("1.0", |d| d.json_version);
                let wire = Wire::from_model(&model, json_version);
                let request = build_request(
                    endpoint,
                    &wire,
                    &operation.name,
                    &doc,
                    Some((&model, operation)),
                )?;

                let signing_name = model
                    .metadata
                    .signing_name
                    .clone()
                    .or_else(|| model.metadata.endpoint_prefix.clone())
                    .unwrap_or_else(|| service.api.to_string());
                let protocol = model.metadata.protocol;
                let operation = operation.name.clone();
                Ok(Prepared {
                    request,
                    protocol,
                    signing_name,
                    schema: Some((model, operation)),
                })
            }
            None => {
                let defaults = required_defaults(service, settings)?;
                debug!(api = service.api, "no service model installed; guessing parameter types");
                let doc = coerce_heuristic(decode(params)?, |key| service.is_exempt(key));
                let request = build_request(endpoint, &wire_of(&defaults), &to_pascal_case(action), &doc, None)?;
                Ok(Prepared::from_defaults(request, &defaults))
            }
        },
    }
}

impl Prepared {
    fn from_defaults(request: HttpRequest, defaults: &WireDefaults) -> Self {
        Prepared {
            request,
            protocol: defaults.protocol,
            signing_name: defaults.signing_name.to_string(),
            schema: None,
        }
    }
}

fn required_defaults(service: &ServiceConfig, settings: &Settings) -> Result<WireDefaults, CliError> {
    service.fallback.ok_or_else(|| {
        CliError::from(ModelError::NotFound {
            api: service.api.to_string(),
            dir: settings.models_dir.clone(),
        })
    })
}

fn wire_of(defaults: &WireDefaults) -> Wire<'static> {
    Wire {
        protocol: defaults.protocol,
        api_version: defaults.api_version,
        target_prefix: defaults.target_prefix,
        json_version: defaults.json_version,
    }
}
