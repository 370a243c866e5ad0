//! Error types for drift detection

use thiserror::Error;

/// Result type alias for drift detection operations
pub type Result<T> = std::result::Result<T, DriftError>;

/// Main error type for the detector and its collaborators
#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid correction: {0} (expected 'bonferroni' or 'fdr')")]
    InvalidCorrection(String),

    #[error("Invalid alternative: {0} (expected 'two-sided', 'less' or 'greater')")]
    InvalidAlternative(String),

    #[error("Invalid drift type: {0} (expected 'batch' or 'feature')")]
    InvalidDriftType(String),

    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),

    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Could not infer feature count: {0}")]
    FeatureInference(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid shape: {0}")]
    Shape(String),
}

impl DriftError {
    /// Build an `InvalidParameter` error
    pub fn invalid_parameter(name: &str, value: impl ToString, reason: &str) -> Self {
        DriftError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for DriftError {
    fn from(err: polars::error::PolarsError) -> Self {
        DriftError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DriftError {
    fn from(err: ndarray::ShapeError) -> Self {
        DriftError::Shape(err.to_string())
    }
}
