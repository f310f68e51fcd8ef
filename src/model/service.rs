//! Service models in the botocore `service-2.json` format.

use super::errors::{ModelError, ModelResult};
use super::shape::{MemberRef, ParamShape, ShapeResolver};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wire protocol a service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Protocol {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "ec2")]
    Ec2,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "rest-json")]
    RestJson,
    #[serde(rename = "rest-xml")]
    RestXml,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Query => "query",
            Protocol::Ec2 => "ec2",
            Protocol::Json => "json",
            Protocol::RestJson => "rest-json",
            Protocol::RestXml => "rest-xml",
        }
    }

    /// Protocols whose requests are routed by URI templates and therefore
    /// cannot be built without a model.
    pub fn is_rest(&self) -> bool {
        matches!(self, Protocol::RestJson | Protocol::RestXml)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub api_version: String,
    pub protocol: Protocol,
    pub endpoint_prefix: Option<String>,
    pub signing_name: Option<String>,
    pub service_id: Option<String>,
    pub target_prefix: Option<String>,
    pub json_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpBinding {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
}

impl Default for HttpBinding {
    fn default() -> Self {
        HttpBinding {
            method: default_method(),
            request_uri: default_request_uri(),
        }
    }
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_request_uri() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationDef {
    pub name: String,
    #[serde(default)]
    pub http: HttpBinding,
    pub input: Option<MemberRef>,
    pub output: Option<MemberRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceModel {
    pub metadata: ServiceMetadata,
    pub operations: IndexMap<String, OperationDef>,
    shapes: HashMap<String, ParamShape>,
}

impl ServiceModel {
    pub fn from_json(text: &str) -> ModelResult<Self> {
        let mut model: ServiceModel = serde_json::from_str(text)?;
        for (name, shape) in model.shapes.iter_mut() {
            shape.name = name.clone();
        }
        model.check_shapes()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        debug!(path = %path.display(), "loading service model");
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads the model for `api` from `dir`, if one is installed.
    ///
    /// Looks for `<dir>/<api>.json`, then `<dir>/<api>/service-2.json`, then
    /// the botocore layout `<dir>/<api>/<version>/service-2.json` using the
    /// newest version directory.
    pub fn find(dir: &Path, api: &str) -> ModelResult<Option<Self>> {
        match locate(dir, api) {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`ServiceModel::find`], but a missing model is an error.
    pub fn find_required(dir: &Path, api: &str) -> ModelResult<Self> {
        Self::find(dir, api)?.ok_or_else(|| ModelError::NotFound {
            api: api.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    pub fn shape(&self, name: &str) -> Option<&ParamShape> {
        self.shapes.get(name)
    }

    pub fn input_shape(&self, operation: &OperationDef) -> Option<&ParamShape> {
        operation.input.as_ref().and_then(|input| self.shape(&input.shape))
    }

    /// Shape of the operation's response. For the query protocols this is
    /// the contents of the `*Result` element.
    pub fn output_shape(&self, operation: &OperationDef) -> Option<&ParamShape> {
        operation.output.as_ref().and_then(|output| self.shape(&output.shape))
    }

    fn check_shapes(&self) -> ModelResult<()> {
        for operation in self.operations.values() {
            let references = operation.input.iter().chain(operation.output.iter());
            for reference in references {
                if !self.shapes.contains_key(&reference.shape) {
                    return Err(ModelError::MissingShape {
                        operation: operation.name.clone(),
                        shape: reference.shape.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl ShapeResolver for ServiceModel {
    fn resolve(&self, name: &str) -> Option<&ParamShape> {
        self.shape(name)
    }
}

fn locate(dir: &Path, api: &str) -> Option<PathBuf> {
    let flat = dir.join(format!("{}.json", api));
    if flat.is_file() {
        return Some(flat);
    }

    let service_dir = dir.join(api);
    let direct = service_dir.join("service-2.json");
    if direct.is_file() {
        return Some(direct);
    }

    let mut versions: Vec<PathBuf> = fs::read_dir(&service_dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.join("service-2.json").is_file())
        .collect();
    versions.sort();
    versions.pop().map(|version| version.join("service-2.json"))
}
