use thiserror::Error;

use crate::parameters::bounds::BoundsError;

/// Error types for the trmc-rs library.
#[derive(Error, Debug)]
pub enum TrmcError {
    /// A parameter name was referenced that does not exist in the list.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// A parameter with the same name is already present.
    #[error("Duplicate parameter name: {0}")]
    DuplicateName(String),

    /// The reduced argument vector does not match the number of free parameters.
    #[error("Mismatched number of arguments: expected {expected}, received {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// The solver failed to converge. Parameter values are left untouched.
    #[error("Fit did not converge: {0}")]
    FitDidNotConverge(String),

    /// Not enough observations to run a fit.
    #[error("Insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid bounds or a value outside its bounds.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// A data file could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for trmc-rs operations.
pub type Result<T> = std::result::Result<T, TrmcError>;
