//! Loading per-video latent embeddings and motif labels.
//!
//! A video is either loaded completely (both arrays, equal frame counts) or
//! not at all. Missing and unreadable files never fail the batch: the video
//! is dropped from both mappings and its outcome is recorded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, ReadNpyError};
use tracing::{debug, info, warn};

use motif_models::{MotifId, VideoId, VideoLoadOutcome, VideoLoadRecord, VideoLoadStatus};

use crate::layout::DataLayout;

/// Arrays of one successfully loaded video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoArrays {
    /// `(frames, embedding_dim)` latent embeddings
    pub embeddings: Array2<f64>,
    /// One motif label per frame
    pub labels: Vec<MotifId>,
}

impl VideoArrays {
    pub fn frames(&self) -> usize {
        self.labels.len()
    }

    pub fn embedding_dim(&self) -> usize {
        self.embeddings.ncols()
    }
}

/// Result of loading a batch of videos.
///
/// `embeddings` and `labels` always share the same key set; `loaded`
/// lists those keys in the order the videos were requested.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub embeddings: HashMap<VideoId, Array2<f64>>,
    pub labels: HashMap<VideoId, Vec<MotifId>>,
    pub loaded: Vec<VideoId>,
    pub outcomes: Vec<VideoLoadRecord>,
}

impl LoadReport {
    /// Loaded videos in request order.
    pub fn videos(&self) -> impl Iterator<Item = (&VideoId, &Array2<f64>, &[MotifId])> + '_ {
        self.loaded.iter().filter_map(move |video| {
            let embeddings = self.embeddings.get(video)?;
            let labels = self.labels.get(video)?;
            Some((video, embeddings, labels.as_slice()))
        })
    }

    pub fn count(&self, status: VideoLoadStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.status() == status)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Load latents and labels for every requested video.
pub fn load_latents_and_labels(videos: &[VideoId], layout: &DataLayout) -> LoadReport {
    let mut report = LoadReport::default();

    for video in videos {
        let outcome = match load_video(video, layout) {
            Ok(arrays) => {
                let outcome = VideoLoadOutcome::Loaded {
                    frames: arrays.frames(),
                    embedding_dim: arrays.embedding_dim(),
                };
                report.embeddings.insert(video.clone(), arrays.embeddings);
                report.labels.insert(video.clone(), arrays.labels);
                report.loaded.push(video.clone());
                outcome
            }
            Err(outcome) => {
                match &outcome {
                    VideoLoadOutcome::Missing { path } => warn!(
                        video = %video,
                        path = %path.display(),
                        "File not found for video, skipping"
                    ),
                    VideoLoadOutcome::Malformed { path, reason } => warn!(
                        video = %video,
                        path = %path.display(),
                        reason = %reason,
                        "Failed to load data for video, skipping"
                    ),
                    VideoLoadOutcome::Loaded { .. } => {}
                }
                outcome
            }
        };

        report.outcomes.push(VideoLoadRecord {
            video: video.clone(),
            outcome,
        });
    }

    info!(
        requested = videos.len(),
        loaded = report.count(VideoLoadStatus::Loaded),
        missing = report.count(VideoLoadStatus::Missing),
        malformed = report.count(VideoLoadStatus::Malformed),
        "Read latents and labels"
    );

    report
}

/// Load one video, or describe why it cannot be used.
///
/// The `Err` side is always `Missing` or `Malformed`.
pub fn load_video(video: &VideoId, layout: &DataLayout) -> Result<VideoArrays, VideoLoadOutcome> {
    let latent_path = layout.latent_path(video);
    let label_path = layout.label_path(video);

    for path in [&latent_path, &label_path] {
        if !path.is_file() {
            return Err(VideoLoadOutcome::Missing { path: path.clone() });
        }
    }

    let embeddings = read_latents(&latent_path).map_err(|e| classify(&latent_path, e))?;
    let raw_labels = read_labels(&label_path).map_err(|e| classify(&label_path, e))?;

    let mut labels = Vec::with_capacity(raw_labels.len());
    for (frame, &raw) in raw_labels.iter().enumerate() {
        match MotifId::from_label(raw) {
            Some(id) => labels.push(id),
            None => {
                return Err(VideoLoadOutcome::Malformed {
                    path: label_path,
                    reason: format!("invalid motif label {} at frame {}", raw, frame),
                })
            }
        }
    }

    if embeddings.nrows() != labels.len() {
        return Err(VideoLoadOutcome::Malformed {
            path: label_path,
            reason: format!(
                "{} latent frames but {} labels",
                embeddings.nrows(),
                labels.len()
            ),
        });
    }

    debug!(
        video = %video,
        frames = labels.len(),
        embedding_dim = embeddings.ncols(),
        "Loaded video arrays"
    );

    Ok(VideoArrays { embeddings, labels })
}

/// Read a latent array stored as float64 or float32.
fn read_latents(path: &Path) -> Result<Array2<f64>, ReadNpyError> {
    match read_npy::<_, Array2<f64>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {
            read_npy::<_, Array2<f32>>(path).map(|a| a.mapv(f64::from))
        }
        other => other,
    }
}

/// Read a label array stored as any common integer width.
fn read_labels(path: &Path) -> Result<Array1<i64>, ReadNpyError> {
    match read_npy::<_, Array1<i64>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other,
    }
    match read_npy::<_, Array1<i32>>(path) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return other.map(|a| a.mapv(i64::from)),
    }
    read_npy::<_, Array1<u32>>(path).map(|a| a.mapv(i64::from))
}

fn classify(path: &Path, err: ReadNpyError) -> VideoLoadOutcome {
    let path: PathBuf = path.to_path_buf();
    match err {
        ReadNpyError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
            VideoLoadOutcome::Missing { path }
        }
        other => VideoLoadOutcome::Malformed {
            path,
            reason: other.to_string(),
        },
    }
}
