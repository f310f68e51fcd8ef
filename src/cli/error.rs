use crate::config::ConfigError;
use crate::model::ModelError;
use crate::params::ParamsError;
use crate::transport::TransportError;
use thiserror::Error;

/// Everything an invocation can fail with. Each variant prints as the
/// single line shown to the user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
