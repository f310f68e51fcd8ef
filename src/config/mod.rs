//! Runtime settings resolved from the environment.
//!
//! Every lookup goes through a `Fn(&str) -> Option<String>` so tests can
//! supply a fixed environment instead of mutating the process one.

use crate::services::{CredentialKind, ServiceConfig};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const BASE_ACCESS_KEY_VAR: &str = "BASE_AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const MODELS_DIR_VAR: &str = "C2_MODELS_DIR";
pub const REGION_VAR: &str = "C2_REGION";
pub const DEBUG_VAR: &str = "DEBUG";

const DEFAULT_REGION: &str = "croc";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' not found.")]
    EnvironmentVariableMissing(String),

    #[error("Invalid endpoint URL in {var}: {details}")]
    InvalidEndpoint { var: String, details: String },

    #[error("Cannot determine a directory for service models; set {0}")]
    NoModelsDir(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reads the process environment.
pub fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Returns the variable's value or a missing-variable error naming it.
pub fn get_env_var<F>(lookup: &F, name: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| ConfigError::EnvironmentVariableMissing(name.to_uppercase()))
}

/// Whether the `DEBUG` toggle is set to anything non-empty.
pub fn debug_enabled<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(DEBUG_VAR).is_some_and(|value| !value.is_empty())
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn resolve<F>(kind: CredentialKind, lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key_var = match kind {
            CredentialKind::Default => ACCESS_KEY_VAR,
            CredentialKind::Base => BASE_ACCESS_KEY_VAR,
        };

        Ok(Credentials {
            access_key_id: get_env_var(lookup, access_key_var)?,
            secret_access_key: get_env_var(lookup, SECRET_KEY_VAR)?,
            session_token: lookup(SESSION_TOKEN_VAR).filter(|token| !token.is_empty()),
        })
    }
}

/// Everything one invocation needs besides its parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: Url,
    pub credentials: Credentials,
    pub region: String,
    pub models_dir: PathBuf,
    pub verify_ssl: bool,
}

impl Settings {
    pub fn from_env(service: &ServiceConfig, verify_ssl: bool) -> ConfigResult<Self> {
        Self::resolve(service, verify_ssl, &process_env)
    }

    pub fn resolve<F>(service: &ServiceConfig, verify_ssl: bool, lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_endpoint = get_env_var(lookup, service.endpoint_var)?;
        let endpoint = parse_endpoint(service.endpoint_var, &raw_endpoint)?;
        let credentials = Credentials::resolve(service.credentials, lookup)?;

        let region = lookup(REGION_VAR)
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let models_dir = match lookup(MODELS_DIR_VAR).filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_models_dir().ok_or(ConfigError::NoModelsDir(MODELS_DIR_VAR))?,
        };

        debug!(
            endpoint = %endpoint,
            region = %region,
            models_dir = %models_dir.display(),
            verify_ssl,
            "resolved settings"
        );

        Ok(Settings {
            endpoint,
            credentials,
            region,
            models_dir,
            verify_ssl,
        })
    }
}

fn parse_endpoint(var: &str, raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        var: var.to_string(),
        details: format!("'{}': {}", raw, e),
    })?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint {
            var: var.to_string(),
            details: format!("'{}' has no host", raw),
        });
    }

    Ok(url)
}

fn default_models_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("c2client").join("models"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ServiceConfig, ServiceId};
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_variable_is_named() {
        let lookup = env_of(&[]);
        let err = get_env_var(&lookup, "ec2_url").unwrap_err();
        assert_eq!(err.to_string(), "Environment variable 'EC2_URL' not found.");
    }

    #[test]
    fn test_resolve_settings() {
        let lookup = env_of(&[
            ("EC2_URL", "https://api.cloud.example:8443/"),
            ("AWS_ACCESS_KEY_ID", "project:user@example"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("C2_MODELS_DIR", "/opt/models"),
        ]);
        let settings =
            Settings::resolve(ServiceConfig::get(ServiceId::Ec2), false, &lookup).unwrap();

        assert_eq!(settings.endpoint.host_str(), Some("api.cloud.example"));
        assert_eq!(settings.endpoint.port(), Some(8443));
        assert_eq!(settings.credentials.access_key_id, "project:user@example");
        assert!(settings.credentials.session_token.is_none());
        assert_eq!(settings.region, "croc");
        assert_eq!(settings.models_dir, PathBuf::from("/opt/models"));
        assert!(!settings.verify_ssl);
    }

    #[test]
    fn test_missing_endpoint() {
        let lookup = env_of(&[("AWS_ACCESS_KEY_ID", "a"), ("AWS_SECRET_ACCESS_KEY", "b")]);
        let err = Settings::resolve(ServiceConfig::get(ServiceId::Eks), true, &lookup).unwrap_err();
        assert_eq!(err, ConfigError::EnvironmentVariableMissing("EKS_URL".to_string()));
    }

    #[test]
    fn test_invalid_endpoint() {
        let lookup = env_of(&[
            ("EKS_URL", "not a url"),
            ("AWS_ACCESS_KEY_ID", "a"),
            ("AWS_SECRET_ACCESS_KEY", "b"),
        ]);
        let err = Settings::resolve(ServiceConfig::get(ServiceId::Eks), true, &lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_base_credentials() {
        let lookup = env_of(&[
            ("AWS_ACCESS_KEY_ID", "user-key"),
            ("BASE_AWS_ACCESS_KEY_ID", "base-key"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
        ]);

        let base = Credentials::resolve(CredentialKind::Base, &lookup).unwrap();
        assert_eq!(base.access_key_id, "base-key");
        assert_eq!(base.session_token.as_deref(), Some("token"));

        let default = Credentials::resolve(CredentialKind::Default, &lookup).unwrap();
        assert_eq!(default.access_key_id, "user-key");
    }

    #[test]
    fn test_base_credentials_required_for_iam() {
        let lookup = env_of(&[
            ("IAM_URL", "https://iam.example/"),
            ("AWS_ACCESS_KEY_ID", "user-key"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("C2_MODELS_DIR", "/tmp"),
        ]);
        let err = Settings::resolve(ServiceConfig::get(ServiceId::Iam), true, &lookup).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EnvironmentVariableMissing("BASE_AWS_ACCESS_KEY_ID".to_string())
        );
    }

    #[test]
    fn test_debug_toggle() {
        assert!(debug_enabled(&env_of(&[("DEBUG", "1")])));
        assert!(!debug_enabled(&env_of(&[("DEBUG", "")])));
        assert!(!debug_enabled(&env_of(&[])));
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = Credentials {
            access_key_id: "id".to_string(),
            secret_access_key: "hunter2".to_string(),
            session_token: None,
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
