//! Error types for the datapilot crate

use thiserror::Error;

/// Result type alias for datapilot operations
pub type Result<T> = std::result::Result<T, DataPilotError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum DataPilotError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DataPilotError {
    fn from(err: serde_json::Error) -> Self {
        DataPilotError::SerializationError(err.to_string())
    }
}
