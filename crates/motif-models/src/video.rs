//! Per-video load outcomes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::VideoId;

/// What happened when the loader tried to read one video's arrays.
///
/// Only `Loaded` videos take part in the analysis. `Missing` and
/// `Malformed` videos are dropped as a whole and recorded so the caller can
/// decide whether the reduced dataset is still acceptable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoLoadOutcome {
    /// Both arrays were read and have the same frame count.
    Loaded { frames: usize, embedding_dim: usize },
    /// One of the expected files does not exist.
    Missing { path: PathBuf },
    /// A file exists but could not be decoded, or the arrays disagree.
    Malformed { path: PathBuf, reason: String },
}

impl VideoLoadOutcome {
    pub fn status(&self) -> VideoLoadStatus {
        match self {
            VideoLoadOutcome::Loaded { .. } => VideoLoadStatus::Loaded,
            VideoLoadOutcome::Missing { .. } => VideoLoadStatus::Missing,
            VideoLoadOutcome::Malformed { .. } => VideoLoadStatus::Malformed,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, VideoLoadOutcome::Loaded { .. })
    }
}

/// Coarse status of a load outcome, for counting and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoLoadStatus {
    Loaded,
    Missing,
    Malformed,
}

impl VideoLoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoLoadStatus::Loaded => "loaded",
            VideoLoadStatus::Missing => "missing",
            VideoLoadStatus::Malformed => "malformed",
        }
    }
}

impl fmt::Display for VideoLoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load outcome paired with the video it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoLoadRecord {
    pub video: VideoId,
    #[serde(flatten)]
    pub outcome: VideoLoadOutcome,
}
