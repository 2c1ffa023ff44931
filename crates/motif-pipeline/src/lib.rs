//! Motif community pipeline.
//!
//! This crate provides:
//! - Layered run configuration (defaults, config file, `MOTIF_` env vars)
//! - Seeded sampling of video directories
//! - The end-to-end run: load, pool, distance matrix, linkage, report
//! - Structured run logging

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod sampling;

pub use crate::config::AnalysisConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use pipeline::{fraction_tag, CommunityPipeline, RunSummary};
pub use sampling::select_videos;
