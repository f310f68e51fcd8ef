use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    /// An error response from the service, printed the way the service sent it.
    #[error("{code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to process XML: {0}")]
    Xml(String),
}

impl TransportError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        TransportError::InvalidRequest(msg.into())
    }

    pub fn xml(err: impl std::fmt::Display) -> Self {
        TransportError::Xml(err.to_string())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
