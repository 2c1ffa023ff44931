//! Report rendering for motif community runs.
//!
//! Produces SVG files only:
//! - the dendrogram of the average-linkage tree, labelled by motif id, with
//!   the community cut height drawn as a dashed line
//! - per-video motif usage bar charts

pub mod dendrogram;
pub mod error;
pub mod usage_chart;

pub use dendrogram::{render_dendrogram, DendrogramLayout, DendrogramLink, DendrogramOptions};
pub use error::{ReportError, ReportResult};
pub use usage_chart::{render_motif_usage, UsageBar, UsageChartOptions};
