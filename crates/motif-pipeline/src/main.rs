//! Motif community analysis binary.
//!
//! Usage: `motif-community [config-file]`

use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use motif_pipeline::{AnalysisConfig, CommunityPipeline};

fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for interactive use, JSON for log collection
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("motif=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting motif-community");

    let loaded = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => AnalysisConfig::load(Some(&path)),
        None => AnalysisConfig::from_env(),
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Analysis config: {:?}", config);

    let pipeline = match CommunityPipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create pipeline: {}", e);
            std::process::exit(1);
        }
    };

    match pipeline.run() {
        Ok(summary) => {
            info!(
                run_id = %summary.run_id,
                selected = summary.selected_videos,
                loaded = summary.loaded_videos,
                motifs = summary.matrix_motifs,
                communities = summary.communities,
                reused = summary.matrix_reused,
                dendrogram = %summary.dendrogram_path.display(),
                manifest = %summary.manifest_path.display(),
                "motif-community finished"
            );
        }
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
