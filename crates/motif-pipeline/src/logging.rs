//! Structured run logging.
//!
//! Every lifecycle event of an analysis run carries the run id, the current
//! stage and the time spent in that stage.

use std::time::{Duration, Instant};

use tracing::{error, info, warn, Span};

use motif_models::RunId;

/// Run logger for structured logging with consistent formatting.
///
/// One logger is created per run; each pipeline stage derives its own with
/// [`RunLogger::with_stage`], which restarts the stage clock.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    stage: String,
    stage_started: Instant,
}

impl RunLogger {
    /// Create a logger for a run, starting in `stage`.
    pub fn new(run_id: &RunId, stage: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: stage.to_string(),
            stage_started: Instant::now(),
        }
    }

    /// Same run, next stage. The stage clock starts now.
    pub fn with_stage(&self, stage: &str) -> Self {
        Self {
            run_id: self.run_id.clone(),
            stage: stage.to_string(),
            stage_started: Instant::now(),
        }
    }

    /// Log the start of the run with its parameters.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            "Run started: {}", message
        );
    }

    /// Log a progress update within the current stage.
    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            elapsed_ms = self.elapsed_ms(),
            "Run progress: {}", message
        );
    }

    /// Log a recoverable problem, such as a skipped video or an empty motif.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %self.stage,
            "Run warning: {}", message
        );
    }

    /// Log the error that ended the run.
    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            stage = %self.stage,
            elapsed_ms = self.elapsed_ms(),
            "Run error: {}", message
        );
    }

    /// Log the end of the current stage with the time it took.
    pub fn log_stage_done(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            elapsed_ms = self.elapsed_ms(),
            "Stage finished: {}", message
        );
    }

    /// Log the completion of the run.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            elapsed_ms = self.elapsed_ms(),
            "Run completed: {}", message
        );
    }

    /// Get the run ID.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the current stage name.
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Time spent in the current stage.
    pub fn elapsed(&self) -> Duration {
        self.stage_started.elapsed()
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Create a tracing span for the run.
    ///
    /// Events logged inside it inherit the run id and the stage the logger
    /// was created with.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            stage = %self.stage
        )
    }
}
