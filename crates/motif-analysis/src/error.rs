//! Analysis error types.
//!
//! Every variant here is fatal for a run: recoverable per-video problems
//! are handled by the loader before any analysis starts.

use thiserror::Error;

use motif_models::{ModelError, MotifId, VideoId};

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Number of frames and labels do not match for video {video}: {frames} frames, {labels} labels")]
    FrameMismatch {
        video: VideoId,
        frames: usize,
        labels: usize,
    },

    #[error("Embedding dimension mismatch: video {video} has {found}, expected {expected}")]
    DimensionMismatch {
        video: VideoId,
        expected: usize,
        found: usize,
    },

    #[error("Cannot compute a distance from an empty sample")]
    EmptySample,

    #[error("Sample contains a non-finite value: {0}")]
    NonFiniteSample(f64),

    #[error("Motif {0} has no pooled values to compare")]
    MissingPool(MotifId),

    #[error("Invalid distance between motifs {a} and {b}: {reason}")]
    InvalidDistance { a: MotifId, b: MotifId, reason: String },

    #[error("Distance matrix cell ({row}, {col}) was never computed")]
    UncomputedCell { row: usize, col: usize },

    #[error("No motifs left to cluster")]
    NoMotifs,

    #[error("Model invariant violated: {0}")]
    Model(#[from] ModelError),
}

impl AnalysisError {
    pub fn invalid_distance(a: MotifId, b: MotifId, reason: impl Into<String>) -> Self {
        Self::InvalidDistance {
            a,
            b,
            reason: reason.into(),
        }
    }
}
