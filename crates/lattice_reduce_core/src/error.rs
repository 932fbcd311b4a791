//! Error types for lattice reduction

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LllError {
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid reduction parameter: {0}")]
    InvalidParameter(String),

    #[error("Floating-point precision exhausted while size-reducing row {kappa}")]
    PrecisionExhausted { kappa: usize },

    #[error("Failed to parse basis: {0}")]
    Parse(String),
}

impl LllError {
    pub(crate) fn dims(
        context: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        LllError::DimensionMismatch {
            context,
            expected: format!("{}×{}", expected.0, expected.1),
            actual: format!("{}×{}", actual.0, actual.1),
        }
    }
}

pub type Result<T> = std::result::Result<T, LllError>;
