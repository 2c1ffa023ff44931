//! Motif community analysis.
//!
//! Pipeline stages, each a pure transformation over in-memory data:
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Video frames │───►│ Filter/Pool  │───►│ Wasserstein  │───►│ Average      │
//! │ (per video)  │    │ (per motif)  │    │ matrix (n×n) │    │ linkage tree │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Frames are first filtered to the requested motif set and regrouped into
//! one flattened value pool per motif. All pairs of pools are compared with
//! the one-dimensional earth mover's distance, and the resulting matrix is
//! clustered with average linkage.

pub mod aggregate;
pub mod distance;
pub mod error;
pub mod linkage;
pub mod usage;
pub mod wasserstein;

pub use aggregate::{
    combine_filtered, filter_by_motifs, pool_by_motif, CombinedFrames, FilteredVideo, MotifPools,
    PoolEntry, VideoFrames,
};
pub use distance::{compute_distance_matrix, pools_fingerprint, DistanceMode};
pub use error::{AnalysisError, AnalysisResult};
pub use linkage::{average_linkage, cut_tree};
pub use usage::{motif_usage, MotifUsage};
pub use wasserstein::{wasserstein_distance, wasserstein_sorted, SortedSample};
