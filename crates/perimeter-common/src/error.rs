//! Error types for the fire perimeter crates.

use thiserror::Error;

/// Result type alias using PerimeterError.
pub type PerimeterResult<T> = Result<T, PerimeterError>;

/// Primary error type for data model and configuration problems.
#[derive(Debug, Error)]
pub enum PerimeterError {
    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Failed to decode feature data: {0}")]
    Decode(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },
}

impl PerimeterError {
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        PerimeterError::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PerimeterError {
    fn from(err: serde_json::Error) -> Self {
        PerimeterError::Decode(format!("JSON error: {}", err))
    }
}
