//! Motif filtering and per-motif pooling.

use ndarray::{Array2, ArrayView2, Axis};
use tracing::{debug, warn};

use motif_models::{ModelError, MotifFrameCount, MotifId, MotifSet, VideoId};

use crate::error::{AnalysisError, AnalysisResult};

/// Borrowed arrays of one loaded video.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrames<'a> {
    pub video: &'a VideoId,
    /// `(frames, embedding_dim)` latent embeddings
    pub embeddings: ArrayView2<'a, f64>,
    /// One motif label per frame
    pub labels: &'a [MotifId],
}

impl<'a> VideoFrames<'a> {
    pub fn new(video: &'a VideoId, embeddings: ArrayView2<'a, f64>, labels: &'a [MotifId]) -> Self {
        Self {
            video,
            embeddings,
            labels,
        }
    }

    fn check_frames(&self) -> AnalysisResult<()> {
        if self.embeddings.nrows() != self.labels.len() {
            return Err(AnalysisError::FrameMismatch {
                video: self.video.clone(),
                frames: self.embeddings.nrows(),
                labels: self.labels.len(),
            });
        }
        Ok(())
    }
}

/// One video restricted to frames of the requested motifs.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredVideo {
    pub video: VideoId,
    pub embeddings: Array2<f64>,
    pub labels: Vec<MotifId>,
}

/// Keep only frames whose label is in `motifs`, per video.
///
/// Fails if the sliced embeddings and labels disagree in length; that can
/// only happen on corrupted input and must stop the run.
pub fn filter_by_motifs(
    videos: &[VideoFrames<'_>],
    motifs: &MotifSet,
) -> AnalysisResult<Vec<FilteredVideo>> {
    let mut filtered = Vec::with_capacity(videos.len());

    for frames in videos {
        frames.check_frames()?;

        let keep: Vec<usize> = frames
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| motifs.contains(**label))
            .map(|(i, _)| i)
            .collect();

        let embeddings = frames.embeddings.select(Axis(0), &keep);
        let labels: Vec<MotifId> = keep.iter().map(|&i| frames.labels[i]).collect();

        if embeddings.nrows() != labels.len() {
            return Err(AnalysisError::FrameMismatch {
                video: frames.video.clone(),
                frames: embeddings.nrows(),
                labels: labels.len(),
            });
        }

        debug!(
            video = %frames.video,
            kept = labels.len(),
            total = frames.labels.len(),
            "Filtered frames by motif"
        );

        filtered.push(FilteredVideo {
            video: frames.video.clone(),
            embeddings,
            labels,
        });
    }

    Ok(filtered)
}

/// Filtered frames of every video concatenated along the frame axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedFrames {
    pub embeddings: Array2<f64>,
    pub labels: Vec<MotifId>,
}

impl CombinedFrames {
    pub fn frames(&self) -> usize {
        self.labels.len()
    }

    /// Frame count of every motif in `motifs`, in set order.
    pub fn frame_counts(&self, motifs: &MotifSet) -> Vec<MotifFrameCount> {
        let mut counts = vec![0usize; motifs.len()];
        for label in &self.labels {
            if let Some(i) = motifs.index_of(*label) {
                counts[i] += 1;
            }
        }
        motifs
            .iter()
            .zip(counts)
            .map(|(motif, frames)| MotifFrameCount { motif, frames })
            .collect()
    }
}

/// Concatenate filtered videos in the given order.
pub fn combine_filtered(filtered: &[FilteredVideo]) -> AnalysisResult<CombinedFrames> {
    let Some(first) = filtered.first() else {
        return Ok(CombinedFrames {
            embeddings: Array2::zeros((0, 0)),
            labels: Vec::new(),
        });
    };

    let dim = first.embeddings.ncols();
    let total: usize = filtered.iter().map(|v| v.labels.len()).sum();
    let mut data = Vec::with_capacity(total * dim);
    let mut labels = Vec::with_capacity(total);

    for video in filtered {
        if video.embeddings.ncols() != dim {
            return Err(AnalysisError::DimensionMismatch {
                video: video.video.clone(),
                expected: dim,
                found: video.embeddings.ncols(),
            });
        }
        if video.embeddings.nrows() != video.labels.len() {
            return Err(AnalysisError::FrameMismatch {
                video: video.video.clone(),
                frames: video.embeddings.nrows(),
                labels: video.labels.len(),
            });
        }
        for row in video.embeddings.rows() {
            data.extend(row.iter().copied());
        }
        labels.extend_from_slice(&video.labels);
    }

    let embeddings = Array2::from_shape_vec((total, dim), data)
        .map_err(|e| ModelError::shape_mismatch(e.to_string()))?;

    Ok(CombinedFrames { embeddings, labels })
}

/// Pooled embedding values of one motif.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// The motif occurs at least once.
    Filled { values: Vec<f64>, frames: usize },
    /// The motif never occurs in any video.
    Empty,
}

impl PoolEntry {
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            PoolEntry::Filled { values, .. } => Some(values),
            PoolEntry::Empty => None,
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            PoolEntry::Filled { frames, .. } => *frames,
            PoolEntry::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PoolEntry::Empty)
    }
}

/// One pool per motif, aligned with the motif set order.
#[derive(Debug, Clone, PartialEq)]
pub struct MotifPools {
    motifs: MotifSet,
    entries: Vec<PoolEntry>,
}

impl MotifPools {
    /// Build pools directly from entries aligned with `motifs`.
    pub fn from_entries(motifs: MotifSet, entries: Vec<PoolEntry>) -> AnalysisResult<Self> {
        if motifs.len() != entries.len() {
            return Err(ModelError::shape_mismatch(format!(
                "{} motifs but {} pools",
                motifs.len(),
                entries.len()
            ))
            .into());
        }
        Ok(Self { motifs, entries })
    }

    /// Requested motif set, including motifs with empty pools.
    pub fn motifs(&self) -> &MotifSet {
        &self.motifs
    }

    pub fn get(&self, motif: MotifId) -> Option<&PoolEntry> {
        self.motifs.index_of(motif).map(|i| &self.entries[i])
    }

    pub fn values(&self, motif: MotifId) -> Option<&[f64]> {
        self.get(motif).and_then(PoolEntry::values)
    }

    /// Motifs that never occurred, in set order.
    pub fn empty_motifs(&self) -> Vec<MotifId> {
        self.iter()
            .filter(|(_, entry)| entry.is_empty())
            .map(|(motif, _)| motif)
            .collect()
    }

    /// Motifs with a non-empty pool, in set order. This is the matrix order.
    pub fn filled_motifs(&self) -> MotifSet {
        self.motifs
            .retain(|motif| self.get(motif).is_some_and(|entry| !entry.is_empty()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MotifId, &PoolEntry)> + '_ {
        self.motifs.iter().zip(self.entries.iter())
    }
}

/// Gather every frame of each requested motif across all videos.
///
/// Scans the unfiltered labels. Within a pool, values are ordered by video
/// and then by frame, and each frame's embedding row is flattened in place.
/// Motifs that never occur get [`PoolEntry::Empty`] and a warning.
pub fn pool_by_motif(videos: &[VideoFrames<'_>], motifs: &MotifSet) -> AnalysisResult<MotifPools> {
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); motifs.len()];
    let mut frames: Vec<usize> = vec![0; motifs.len()];

    for video in videos {
        video.check_frames()?;
        for (row, label) in video.embeddings.rows().into_iter().zip(video.labels) {
            if let Some(i) = motifs.index_of(*label) {
                values[i].extend(row.iter().copied());
                frames[i] += 1;
            }
        }
    }

    let entries: Vec<PoolEntry> = values
        .into_iter()
        .zip(frames)
        .zip(motifs.iter())
        .map(|((values, frames), motif)| {
            if frames == 0 {
                warn!(
                    motif = %motif,
                    "Motif never occurs in any loaded video, excluding it from the distance matrix"
                );
                PoolEntry::Empty
            } else {
                debug!(motif = %motif, frames, values = values.len(), "Pooled motif embeddings");
                PoolEntry::Filled { values, frames }
            }
        })
        .collect();

    MotifPools::from_entries(motifs.clone(), entries)
}
