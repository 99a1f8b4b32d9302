//! Error types for the delaybench harness

use thiserror::Error;

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Main error type for the benchmark harness
#[derive(Error, Debug)]
pub enum BenchError {
    /// Input source missing or unparsable. Nothing downstream can run.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    NotFitted,

    #[error("Convergence failed after {iterations} iterations")]
    Convergence { iterations: usize },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for BenchError {
    fn from(err: polars::error::PolarsError) -> Self {
        BenchError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for BenchError {
    fn from(err: ndarray::ShapeError) -> Self {
        BenchError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
