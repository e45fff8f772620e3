//! Error types for enose-ml

use enose_core::EnoseError;
use thiserror::Error;

/// Result type for enose-ml operations
pub type Result<T> = std::result::Result<T, MlError>;

/// enose-ml error types
#[derive(Error, Debug)]
pub enum MlError {
    /// Inference or artifact-validity error from the core taxonomy
    #[error(transparent)]
    Core(#[from] EnoseError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Dataset error: {0}")]
    DatasetError(String),
}

impl MlError {
    /// Core error behind this one, if any
    pub fn as_core(&self) -> Option<&EnoseError> {
        match self {
            MlError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MlError {
    fn from(err: std::io::Error) -> Self {
        MlError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MlError {
    fn from(err: serde_json::Error) -> Self {
        MlError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for MlError {
    fn from(err: toml::de::Error) -> Self {
        MlError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for MlError {
    fn from(err: toml::ser::Error) -> Self {
        MlError::ConfigError(err.to_string())
    }
}

impl From<csv::Error> for MlError {
    fn from(err: csv::Error) -> Self {
        MlError::DatasetError(err.to_string())
    }
}
