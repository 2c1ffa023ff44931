//! End-to-end runs over a synthetic results directory.

use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use ndarray_npy::write_npy;
use tempfile::TempDir;

use motif_models::{MotifId, RunManifest, VideoId, VideoLoadStatus};
use motif_pipeline::{AnalysisConfig, CommunityPipeline, PipelineError};
use motif_storage::{write_motif_list, DataLayout};

/// Write one video whose frame `i` has label `labels[i]` and an embedding
/// centred on `10 * label`.
fn write_video(layout: &DataLayout, name: &str, labels: &[i32]) {
    let video = VideoId::from(name);
    fs::create_dir_all(layout.video_dir(&video)).unwrap();

    let latents = Array2::from_shape_fn((labels.len(), 3), |(i, j)| {
        labels[i] as f32 * 10.0 + (i + j) as f32 * 0.1
    });
    write_npy(layout.latent_path(&video), &latents).unwrap();
    write_npy(layout.label_path(&video), &Array1::from(labels.to_vec())).unwrap();
}

struct Fixture {
    _dir: TempDir,
    config: AnalysisConfig,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("results");
    let output_dir = dir.path().join("community");

    let layout = DataLayout::new(&data_dir);
    write_video(&layout, "mouse_a", &[0, 0, 1, 2, 2, 1]);
    write_video(&layout, "mouse_b", &[1, 1, 0, 2]);
    write_video(&layout, "mouse_c", &[2, 0, 3, 3]);

    // Directory without model outputs
    fs::create_dir_all(data_dir.join("mouse_d")).unwrap();

    fs::create_dir_all(&output_dir).unwrap();
    write_motif_list(
        output_dir.join("filtered_motifs.txt"),
        &motif_models::MotifSet::from_ids([2, 0, 1, 5]).unwrap(),
    )
    .unwrap();

    let config = AnalysisConfig {
        data_dir,
        output_dir,
        sample_fraction: 1.0,
        cut_height: 5.0,
        ..Default::default()
    };

    Fixture { _dir: dir, config }
}

fn read_manifest(path: &Path) -> RunManifest {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_full_run_writes_all_artifacts() {
    let f = fixture();
    let out = f.config.output_dir.clone();

    let summary = CommunityPipeline::new(f.config).unwrap().run().unwrap();

    assert_eq!(summary.selected_videos, 4);
    assert_eq!(summary.loaded_videos, 3);
    assert_eq!(summary.matrix_motifs, 3);
    assert_eq!(summary.empty_motifs, vec![MotifId(5)]);
    assert!(!summary.matrix_reused);

    assert!(out.join("selected_videos_1.0.txt").exists());
    assert!(out.join("distance_matrix_1.0.json.gz").exists());
    assert!(out.join("distance_matrix_1.0.npy").exists());
    assert!(out.join("wasserstein_distance_matrix_perc_1.0.svg").exists());
    assert_eq!(summary.manifest_path, out.join("run_manifest_1.0.json"));

    let manifest = read_manifest(&summary.manifest_path);
    assert_eq!(
        manifest.matrix_motifs.ids(),
        &[MotifId(2), MotifId(0), MotifId(1)]
    );
    assert_eq!(manifest.linkage.n_leaves, 3);
    assert_eq!(manifest.linkage.steps.len(), 2);
    assert_eq!(manifest.community_assignments.len(), 3);
    assert_eq!(manifest.community_count(), summary.communities);

    let missing: Vec<_> = manifest
        .load_outcomes
        .iter()
        .filter(|r| r.outcome.status() == VideoLoadStatus::Missing)
        .map(|r| r.video.clone())
        .collect();
    assert_eq!(missing, vec![VideoId::from("mouse_d")]);

    // Motif 3 is filtered out before combining
    let total: usize = manifest.motif_frame_counts.iter().map(|c| c.frames).sum();
    assert_eq!(manifest.combined_frames, total);
    assert_eq!(total, 12);
}

#[test]
fn test_second_run_reuses_cached_matrix() {
    let f = fixture();
    let pipeline = CommunityPipeline::new(f.config.clone()).unwrap();

    let first = pipeline.run().unwrap();
    let second = pipeline.run().unwrap();
    assert!(!first.matrix_reused);
    assert!(second.matrix_reused);

    let a = read_manifest(&first.manifest_path);
    let b = read_manifest(&second.manifest_path);
    assert_eq!(a.matrix_fingerprint, b.matrix_fingerprint);
    assert_eq!(a.linkage, b.linkage);

    let no_reuse = AnalysisConfig {
        reuse_cached_matrix: false,
        ..f.config
    };
    let third = CommunityPipeline::new(no_reuse).unwrap().run().unwrap();
    assert!(!third.matrix_reused);
}

#[test]
fn test_sequential_and_parallel_runs_agree() {
    let f = fixture();
    let parallel = CommunityPipeline::new(AnalysisConfig {
        reuse_cached_matrix: false,
        ..f.config.clone()
    })
    .unwrap()
    .run()
    .unwrap();
    let sequential = CommunityPipeline::new(AnalysisConfig {
        reuse_cached_matrix: false,
        parallel: false,
        ..f.config
    })
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(
        read_manifest(&parallel.manifest_path).linkage,
        read_manifest(&sequential.manifest_path).linkage
    );
}

#[test]
fn test_usage_charts() {
    let f = fixture();
    let out = f.config.output_dir.clone();
    let config = AnalysisConfig {
        plot_motif_usage: true,
        ..f.config
    };

    let summary = CommunityPipeline::new(config).unwrap().run().unwrap();
    let manifest = read_manifest(&summary.manifest_path);

    assert_eq!(manifest.artifacts.usage_charts.len(), 3);
    assert!(out.join("motif_usage_mouse_a.svg").exists());
    assert!(!out.join("motif_usage_mouse_d.svg").exists());
}

#[test]
fn test_failed_usage_chart_is_skipped() {
    let f = fixture();
    let out = f.config.output_dir.clone();
    // A directory where the chart file should go makes that render fail
    fs::create_dir_all(out.join("motif_usage_mouse_b.svg")).unwrap();
    let config = AnalysisConfig {
        plot_motif_usage: true,
        ..f.config
    };

    let summary = CommunityPipeline::new(config).unwrap().run().unwrap();
    let manifest = read_manifest(&summary.manifest_path);

    assert_eq!(manifest.artifacts.usage_charts.len(), 2);
    assert!(!manifest
        .artifacts
        .usage_charts
        .contains(&out.join("motif_usage_mouse_b.svg")));
    assert!(summary.dendrogram_path.exists());
}

#[test]
fn test_zero_fraction_selects_nothing() {
    let f = fixture();
    let config = AnalysisConfig {
        sample_fraction: 0.0,
        ..f.config
    };

    assert!(matches!(
        CommunityPipeline::new(config).unwrap().run(),
        Err(PipelineError::NoVideos(_))
    ));
}

#[test]
fn test_missing_motif_list_fails() {
    let f = fixture();
    let config = AnalysisConfig {
        filtered_motifs_file: Some(f.config.output_dir.join("absent.txt")),
        ..f.config
    };

    assert!(matches!(
        CommunityPipeline::new(config).unwrap().run(),
        Err(PipelineError::Storage(_))
    ));
}

#[test]
fn test_empty_data_dir_fails() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("results");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&data_dir).unwrap();
    fs::create_dir_all(&output_dir).unwrap();
    fs::write(output_dir.join("filtered_motifs.txt"), "1\n").unwrap();

    let config = AnalysisConfig {
        data_dir,
        output_dir,
        ..Default::default()
    };

    assert!(matches!(
        CommunityPipeline::new(config).unwrap().run(),
        Err(PipelineError::NoVideos(_))
    ));
}
