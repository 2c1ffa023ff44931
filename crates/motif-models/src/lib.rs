//! Shared data models for motif community analysis.
//!
//! This crate provides Serde-serializable types for:
//! - Video and motif identifiers
//! - The ordered filtered motif set (motif id <-> matrix index)
//! - Per-video load outcomes
//! - Distance matrices and linkage trees
//! - The run manifest written at the end of every analysis run

pub mod distance;
pub mod error;
pub mod ids;
pub mod linkage;
pub mod manifest;
pub mod motif_set;
pub mod video;

// Re-export common types
pub use distance::{DistanceMatrix, DISTANCE_MATRIX_VERSION};
pub use error::{ModelError, ModelResult};
pub use ids::{MotifId, RunId, VideoId};
pub use linkage::{Linkage, LinkageStep};
pub use manifest::{CommunityAssignment, MotifFrameCount, RunArtifacts, RunManifest};
pub use motif_set::MotifSet;
pub use video::{VideoLoadOutcome, VideoLoadRecord, VideoLoadStatus};
