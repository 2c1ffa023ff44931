//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No usable videos: {0}")]
    NoVideos(String),

    #[error("Storage error: {0}")]
    Storage(#[from] motif_storage::StorageError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] motif_analysis::AnalysisError),

    #[error("Report error: {0}")]
    Report(#[from] motif_report::ReportError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn no_videos(msg: impl Into<String>) -> Self {
        Self::NoVideos(msg.into())
    }
}
