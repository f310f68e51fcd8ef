use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Not found method by name: {0}.")]
    UnknownOperation(String),

    #[error("Service model for '{api}' not found in {dir}")]
    NotFound { api: String, dir: PathBuf },

    #[error("Failed to read service model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Operation '{operation}' refers to unknown shape '{shape}'")]
    MissingShape { operation: String, shape: String },
}

impl ModelError {
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        ModelError::UnknownOperation(name.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
