//! Pairwise Wasserstein distance matrix over motif pools.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use motif_models::{DistanceMatrix, MotifId, MotifSet};

use crate::aggregate::MotifPools;
use crate::error::{AnalysisError, AnalysisResult};
use crate::wasserstein::{wasserstein_sorted, SortedSample};

/// How the upper-triangle pairs are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    Sequential,
    #[default]
    Parallel,
}

impl DistanceMode {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            DistanceMode::Parallel
        } else {
            DistanceMode::Sequential
        }
    }
}

/// Compute the symmetric distance matrix for `motifs`, in set order.
///
/// Every motif in `motifs` must have a filled pool. Each unordered pair is
/// evaluated once and mirrored. The matrix starts out filled with `+inf`
/// off the diagonal so a cell that was never written is caught before the
/// matrix is returned. Both modes produce bit-identical results.
pub fn compute_distance_matrix(
    pools: &MotifPools,
    motifs: &MotifSet,
    mode: DistanceMode,
) -> AnalysisResult<DistanceMatrix> {
    let pooled: Vec<&[f64]> = motifs
        .iter()
        .map(|motif| pools.values(motif).ok_or(AnalysisError::MissingPool(motif)))
        .collect::<AnalysisResult<_>>()?;

    // Sort each pool once; a bad pool is reported against the pair that uses it
    let samples: Vec<AnalysisResult<SortedSample>> = match mode {
        DistanceMode::Sequential => pooled.iter().map(|p| SortedSample::new(p)).collect(),
        DistanceMode::Parallel => pooled.par_iter().map(|p| SortedSample::new(p)).collect(),
    };

    let n = motifs.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    info!(motifs = n, pairs = pairs.len(), mode = ?mode, "Computing Wasserstein distance matrix");

    let evaluate = |&(i, j): &(usize, usize)| -> AnalysisResult<(usize, usize, f64)> {
        match (&samples[i], &samples[j]) {
            (Ok(u), Ok(v)) => Ok((i, j, wasserstein_sorted(u, v))),
            (Err(e), _) | (_, Err(e)) => {
                let (a, b) = pair_ids(motifs, i, j);
                Err(AnalysisError::invalid_distance(a, b, e.to_string()))
            }
        }
    };

    let results: Vec<(usize, usize, f64)> = match mode {
        DistanceMode::Sequential => pairs.iter().map(evaluate).collect::<AnalysisResult<_>>()?,
        DistanceMode::Parallel => pairs.par_iter().map(evaluate).collect::<AnalysisResult<_>>()?,
    };

    let mut values = vec![f64::INFINITY; n * n];
    for i in 0..n {
        values[i * n + i] = 0.0;
    }

    for (i, j, d) in results {
        if !d.is_finite() || d < 0.0 {
            let (a, b) = pair_ids(motifs, i, j);
            return Err(AnalysisError::invalid_distance(
                a,
                b,
                format!("distance {} is not a finite non-negative number", d),
            ));
        }
        values[i * n + j] = d;
        values[j * n + i] = d;
    }

    if let Some(pos) = values.iter().position(|v| v.is_infinite()) {
        return Err(AnalysisError::UncomputedCell {
            row: pos / n,
            col: pos % n,
        });
    }

    let matrix = DistanceMatrix::new(motifs.clone(), values)?;
    matrix.validate()?;

    debug!(motifs = n, "Distance matrix complete");
    Ok(matrix)
}

fn pair_ids(motifs: &MotifSet, i: usize, j: usize) -> (MotifId, MotifId) {
    let id = |k: usize| motifs.motif_at(k).unwrap_or(MotifId(k as u32));
    (id(i), id(j))
}

/// Hex SHA-256 over the motif order and every pool's values.
///
/// Two runs with equal fingerprints produce the same matrix, so a cached
/// matrix can be reused.
pub fn pools_fingerprint(pools: &MotifPools, motifs: &MotifSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update((motifs.len() as u64).to_le_bytes());

    for motif in motifs.iter() {
        hasher.update(motif.get().to_le_bytes());
        match pools.values(motif) {
            Some(values) => {
                hasher.update((values.len() as u64).to_le_bytes());
                for v in values {
                    hasher.update(v.to_bits().to_le_bytes());
                }
            }
            None => hasher.update(u64::MAX.to_le_bytes()),
        }
    }

    format!("{:x}", hasher.finalize())
}
