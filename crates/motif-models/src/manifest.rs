//! Run manifest written at the end of an analysis run.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{Linkage, MotifId, MotifSet, RunId, VideoId, VideoLoadRecord};

/// Number of frames pooled for one motif across the selected videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MotifFrameCount {
    pub motif: MotifId,
    pub frames: usize,
}

/// Flat cluster a motif falls into after cutting the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommunityAssignment {
    pub motif: MotifId,
    pub community: usize,
}

/// Files produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunArtifacts {
    pub selected_videos: Option<PathBuf>,
    pub dendrogram: Option<PathBuf>,
    pub matrix_cache: Option<PathBuf>,
    pub matrix_npy: Option<PathBuf>,
    #[serde(default)]
    pub usage_charts: Vec<PathBuf>,
}

/// Audit record of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunManifest {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    // === Inputs ===
    pub sample_fraction: f64,
    pub seed: u64,
    pub cut_height: f64,
    pub selected_videos: Vec<VideoId>,
    pub load_outcomes: Vec<VideoLoadRecord>,
    /// Motif set as read from the filtered-motif list
    pub filtered_motifs: MotifSet,

    // === Aggregation ===
    /// Requested motifs that never occur in any loaded video
    #[serde(default)]
    pub empty_motifs: Vec<MotifId>,
    /// Frames per motif in the combined filtered arrays
    #[serde(default)]
    pub motif_frame_counts: Vec<MotifFrameCount>,
    pub combined_frames: usize,

    // === Distances and clustering ===
    /// Motifs that made it into the matrix, in matrix order
    pub matrix_motifs: MotifSet,
    pub matrix_fingerprint: String,
    /// Whether the matrix came from the cache instead of being recomputed
    pub matrix_reused: bool,
    pub linkage: Linkage,
    #[serde(default)]
    pub community_assignments: Vec<CommunityAssignment>,

    pub artifacts: RunArtifacts,
}

impl RunManifest {
    /// Number of flat communities at the configured cut height.
    pub fn community_count(&self) -> usize {
        let mut ids: Vec<usize> = self
            .community_assignments
            .iter()
            .map(|a| a.community)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}
