//! Model validation errors.

use thiserror::Error;

use crate::MotifId;

/// Result type for model construction and validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when a model value violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Duplicate motif id {0} in motif set")]
    DuplicateMotif(MotifId),

    #[error("Invalid motif id: {0}")]
    InvalidMotifId(String),

    #[error("Matrix shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Matrix cell ({row}, {col}) is not finite: {value}")]
    NonFinite { row: usize, col: usize, value: f64 },

    #[error("Matrix cell ({row}, {col}) is negative: {value}")]
    Negative { row: usize, col: usize, value: f64 },

    #[error("Matrix is not symmetric at ({row}, {col}): {upper} != {lower}")]
    Asymmetric {
        row: usize,
        col: usize,
        upper: f64,
        lower: f64,
    },

    #[error("Matrix diagonal ({index}, {index}) is {value}, expected 0")]
    NonZeroDiagonal { index: usize, value: f64 },

    #[error("Invalid linkage: {0}")]
    InvalidLinkage(String),
}

impl ModelError {
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn invalid_linkage(msg: impl Into<String>) -> Self {
        Self::InvalidLinkage(msg.into())
    }
}
