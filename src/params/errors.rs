use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("Malformed parameters: cannot place '{key}'")]
    MalformedParameters { key: String },

    #[error("The list's indices start at 1, and {0} is outside that range.")]
    InvalidListIndex(u64),

    #[error("Invalid argument shape at '{path}': expected {expected}, got {found}")]
    InvalidArgumentShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid value for '{path}': '{value}' is not a valid {expected}")]
    InvalidScalar {
        path: String,
        expected: &'static str,
        value: String,
    },
}

impl ParamsError {
    pub fn malformed(key: impl Into<String>) -> Self {
        ParamsError::MalformedParameters { key: key.into() }
    }

    pub fn shape_mismatch(path: &str, expected: &'static str, found: &'static str) -> Self {
        ParamsError::InvalidArgumentShape {
            path: display_path(path),
            expected,
            found,
        }
    }

    pub fn invalid_scalar(path: &str, expected: &'static str, value: impl Into<String>) -> Self {
        ParamsError::InvalidScalar {
            path: display_path(path),
            expected,
            value: value.into(),
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

pub type ParamsResult<T> = Result<T, ParamsError>;
