//! End-to-end motif community run.
//!
//! ```text
//! motif list ─┐
//! video dirs ─┴─► sample ─► load ─► filter/combine ─► pool ─► matrix ─► linkage ─► report
//!                                                              ▲
//!                                                   cache (fingerprint)
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use motif_analysis::{
    average_linkage, combine_filtered, compute_distance_matrix, cut_tree, filter_by_motifs,
    motif_usage, pool_by_motif, pools_fingerprint, AnalysisError, DistanceMode, VideoFrames,
};
use motif_models::{CommunityAssignment, MotifId, RunArtifacts, RunId, RunManifest};
use motif_report::{
    render_dendrogram, render_motif_usage, DendrogramLayout, DendrogramOptions, UsageBar,
    UsageChartOptions,
};
use motif_storage::{
    ensure_directory_exists, list_video_dirs, load_cached_matrix, load_latents_and_labels,
    matrix_cache_path, matrix_npy_path, read_motif_list, save_list_to_file, store_matrix,
    write_atomic, write_matrix_npy, CachedMatrix, LoadReport,
};

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::sampling::select_videos;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub selected_videos: usize,
    pub loaded_videos: usize,
    /// Motifs in the distance matrix
    pub matrix_motifs: usize,
    pub empty_motifs: Vec<MotifId>,
    pub communities: usize,
    pub matrix_reused: bool,
    pub manifest_path: PathBuf,
    pub dendrogram_path: PathBuf,
}

/// One-shot batch run over a results directory.
#[derive(Debug, Clone)]
pub struct CommunityPipeline {
    config: AnalysisConfig,
}

impl CommunityPipeline {
    pub fn new(config: AnalysisConfig) -> PipelineResult<Self> {
        config.validate_config()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage. Any error aborts the run; per-video load problems
    /// are recorded in the manifest instead.
    pub fn run(&self) -> PipelineResult<RunSummary> {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "prepare");
        let span = logger.create_span();
        let _guard = span.enter();

        logger.log_start(&format!(
            "data_dir={}, sample_fraction={}, seed={}, cut_height={}",
            self.config.data_dir.display(),
            self.config.sample_fraction,
            self.config.seed,
            self.config.cut_height
        ));

        let result = self.execute(&run_id, &logger, Utc::now());
        match &result {
            Ok(summary) => logger.log_completion(&format!(
                "{} motifs in {} communities, manifest at {}",
                summary.matrix_motifs,
                summary.communities,
                summary.manifest_path.display()
            )),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    fn execute(
        &self,
        run_id: &RunId,
        logger: &RunLogger,
        started_at: DateTime<Utc>,
    ) -> PipelineResult<RunSummary> {
        let cfg = &self.config;
        let tag = fraction_tag(cfg.sample_fraction);
        let out = cfg.output_dir.as_path();

        ensure_directory_exists(out)?;

        let motifs = read_motif_list(cfg.filtered_motifs_path())?;
        if motifs.is_empty() {
            return Err(AnalysisError::NoMotifs.into());
        }
        logger.log_progress(&format!("{} motifs requested", motifs.len()));

        // === Video selection and loading ===
        let load_logger = logger.with_stage("load");
        let available = list_video_dirs(&cfg.data_dir)?;
        if available.is_empty() {
            return Err(PipelineError::no_videos(format!(
                "no video directories in {}",
                cfg.data_dir.display()
            )));
        }

        let selected = select_videos(&available, cfg.sample_fraction, cfg.seed);
        let selected_path = out.join(format!("selected_videos_{}.txt", tag));
        save_list_to_file(&selected_path, &selected)?;
        if selected.is_empty() {
            return Err(PipelineError::no_videos(format!(
                "sample fraction {} selects none of {} videos",
                cfg.sample_fraction,
                available.len()
            )));
        }

        let report = load_latents_and_labels(&selected, &cfg.data_layout());
        if report.is_empty() {
            return Err(PipelineError::no_videos(format!(
                "none of the {} selected videos could be loaded",
                selected.len()
            )));
        }
        let skipped = selected.len() - report.loaded.len();
        if skipped > 0 {
            load_logger.log_warning(&format!(
                "{} of {} selected videos skipped",
                skipped,
                selected.len()
            ));
        }
        load_logger.log_stage_done(&format!("{} videos loaded", report.loaded.len()));

        let frames: Vec<VideoFrames<'_>> = report
            .videos()
            .map(|(video, embeddings, labels)| VideoFrames::new(video, embeddings.view(), labels))
            .collect();

        // === Aggregation ===
        let agg_logger = logger.with_stage("aggregate");
        let filtered = filter_by_motifs(&frames, &motifs)?;
        let combined = combine_filtered(&filtered)?;
        let motif_frame_counts = combined.frame_counts(&motifs);
        agg_logger.log_stage_done(&format!(
            "{} filtered frames across {} videos",
            combined.frames(),
            filtered.len()
        ));

        let usage_charts = if cfg.plot_motif_usage {
            self.plot_usage(&report, out, &agg_logger)
        } else {
            Vec::new()
        };

        let pools = pool_by_motif(&frames, &motifs)?;
        let empty_motifs = pools.empty_motifs();
        if !empty_motifs.is_empty() {
            agg_logger.log_warning(&format!(
                "motifs without frames excluded from the matrix: {}",
                join_ids(&empty_motifs)
            ));
        }
        let matrix_motifs = pools.filled_motifs();
        if matrix_motifs.is_empty() {
            return Err(AnalysisError::NoMotifs.into());
        }

        // === Distance matrix ===
        let dist_logger = logger.with_stage("distance");
        let fingerprint = pools_fingerprint(&pools, &matrix_motifs);
        let cache_path = matrix_cache_path(out, &tag);
        let cached = if cfg.reuse_cached_matrix {
            load_cached_matrix(&cache_path, &fingerprint)
        } else {
            None
        };
        let matrix_reused = cached.is_some();

        let matrix = match cached {
            Some(matrix) => {
                dist_logger.log_stage_done("reusing cached distance matrix");
                matrix
            }
            None => {
                let matrix = compute_distance_matrix(
                    &pools,
                    &matrix_motifs,
                    DistanceMode::from_parallel(cfg.parallel),
                )?;
                store_matrix(&cache_path, &CachedMatrix::new(fingerprint.clone(), matrix.clone()))?;
                dist_logger.log_stage_done(&format!("{}x{} matrix computed", matrix.size(), matrix.size()));
                matrix
            }
        };

        let npy_path = matrix_npy_path(out, &tag);
        write_matrix_npy(&npy_path, &matrix)?;

        // === Clustering and dendrogram ===
        let cluster_logger = logger.with_stage("cluster");
        let linkage = average_linkage(&matrix)?;
        let community_assignments: Vec<CommunityAssignment> = matrix
            .motifs()
            .iter()
            .zip(cut_tree(&linkage, cfg.cut_height))
            .map(|(motif, community)| CommunityAssignment { motif, community })
            .collect();

        let dendrogram_path = out.join(format!("wasserstein_distance_matrix_perc_{}.svg", tag));
        let opts = DendrogramOptions {
            width: cfg.plot_width,
            height: cfg.plot_height,
            ..Default::default()
        };
        render_dendrogram(
            &dendrogram_path,
            &DendrogramLayout::from_linkage(&linkage),
            matrix.motifs(),
            cfg.cut_height,
            &opts,
        )?;
        cluster_logger.log_stage_done(&format!("dendrogram saved to {}", dendrogram_path.display()));

        // === Manifest ===
        let manifest = RunManifest {
            run_id: run_id.clone(),
            started_at,
            finished_at: Utc::now(),
            sample_fraction: cfg.sample_fraction,
            seed: cfg.seed,
            cut_height: cfg.cut_height,
            selected_videos: selected.clone(),
            load_outcomes: report.outcomes.clone(),
            filtered_motifs: motifs.clone(),
            empty_motifs: empty_motifs.clone(),
            motif_frame_counts,
            combined_frames: combined.frames(),
            matrix_motifs: matrix.motifs().clone(),
            matrix_fingerprint: fingerprint,
            matrix_reused,
            linkage,
            community_assignments,
            artifacts: RunArtifacts {
                selected_videos: Some(selected_path),
                dendrogram: Some(dendrogram_path.clone()),
                matrix_cache: Some(cache_path),
                matrix_npy: Some(npy_path),
                usage_charts,
            },
        };

        let manifest_path = out.join(format!("run_manifest_{}.json", tag));
        write_atomic(&manifest_path, &serde_json::to_vec_pretty(&manifest)?)?;

        Ok(RunSummary {
            run_id: run_id.clone(),
            selected_videos: selected.len(),
            loaded_videos: report.loaded.len(),
            matrix_motifs: matrix.size(),
            empty_motifs,
            communities: manifest.community_count(),
            matrix_reused,
            manifest_path,
            dendrogram_path,
        })
    }

    /// One usage chart per loaded video. Rendering failures are logged and
    /// skipped.
    fn plot_usage(&self, report: &LoadReport, out: &Path, logger: &RunLogger) -> Vec<PathBuf> {
        let opts = UsageChartOptions {
            width: self.config.plot_width,
            height: self.config.plot_height,
        };
        let mut charts = Vec::new();

        for (video, _, labels) in report.videos() {
            let bars: Vec<UsageBar> = motif_usage(labels)
                .sorted_desc()
                .into_iter()
                .map(|(motif, percent)| UsageBar { motif, percent })
                .collect();
            let path = out.join(format!("motif_usage_{}.svg", video));

            match render_motif_usage(&path, video, &bars, &opts) {
                Ok(()) => charts.push(path),
                Err(e) => logger.log_warning(&format!("usage chart for {} skipped: {}", video, e)),
            }
        }

        charts
    }
}

/// File name tag for a sample fraction, e.g. `0.2` or `1.0`.
pub fn fraction_tag(fraction: f64) -> String {
    if fraction.fract() == 0.0 {
        format!("{:.1}", fraction)
    } else {
        format!("{}", fraction)
    }
}

fn join_ids(ids: &[MotifId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
