//! Report error types.

use thiserror::Error;

/// Result type for report rendering.
pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("Nothing to plot: {0}")]
    EmptyPlot(String),

    #[error("Label count mismatch: {leaves} leaves but {labels} labels")]
    LabelMismatch { leaves: usize, labels: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn empty_plot(msg: impl Into<String>) -> Self {
        Self::EmptyPlot(msg.into())
    }
}
