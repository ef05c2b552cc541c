//! Error handling for filterkit
//!
//! All failures are synchronous and surfaced immediately to the caller.
//! A failed configuration call never partially mutates a filter: the
//! instance is left bit-identical to its state before the call.

use thiserror::Error;

/// Result type alias for filterkit operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Main error type for filterkit operations
#[derive(Error, Debug)]
pub enum FilterError {
    // Engine Errors
    #[error("Filter order must be at least 1, got {order}")]
    InvalidOrder { order: usize },

    #[error(
        "Expected coefficient slices of length {expected}, got {got_a} (denominator) and {got_b} (numerator)"
    )]
    CoefficientLengthMismatch {
        expected: usize,
        got_a: usize,
        got_b: usize,
    },

    #[error("Leading denominator coefficient a[0] must be non-zero")]
    ZeroLeadingCoefficient,

    // Cascade Errors
    #[error("Sample rate must be positive, got {samplerate} Hz")]
    InvalidSampleRate { samplerate: f64 },

    #[error(
        "Loudness curve requires matching non-empty sequences, got {frequencies} frequencies and {gains} gains"
    )]
    CurveMismatch { frequencies: usize, gains: usize },

    #[error(
        "Solver returned {got_b} numerator and {got_a} denominator coefficients, expected {expected} of each"
    )]
    SolverOutput {
        expected: usize,
        got_b: usize,
        got_a: usize,
    },

    // I/O Errors (curve-data loading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Curve data error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::InvalidOrder { .. } => "INVALID_ORDER",
            FilterError::CoefficientLengthMismatch { .. } => "COEFFICIENT_LENGTH_MISMATCH",
            FilterError::ZeroLeadingCoefficient => "ZERO_LEADING_COEFFICIENT",
            FilterError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            FilterError::CurveMismatch { .. } => "CURVE_MISMATCH",
            FilterError::SolverOutput { .. } => "SOLVER_OUTPUT",
            FilterError::Io(_) => "IO_ERROR",
            FilterError::Json(_) => "JSON_ERROR",
        }
    }
}
