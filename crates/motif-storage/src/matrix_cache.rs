//! Distance matrix cache helpers.
//!
//! The raw distance matrix is persisted next to the dendrogram as
//! gzip-compressed JSON, tagged with the format version and a fingerprint
//! of the motif pools it was computed from. A later run over the same
//! pools can reuse it instead of recomputing all pairs. A plain `.npy`
//! copy is written as well for use from numpy.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array2;
use ndarray_npy::write_npy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use motif_models::{DistanceMatrix, DISTANCE_MATRIX_VERSION};

use crate::error::{StorageError, StorageResult};
use crate::fs_utils::write_atomic;

/// A persisted matrix together with what it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedMatrix {
    pub version: u32,
    /// Fingerprint of the motif order and pool contents
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub matrix: DistanceMatrix,
}

impl CachedMatrix {
    pub fn new(fingerprint: impl Into<String>, matrix: DistanceMatrix) -> Self {
        Self {
            version: DISTANCE_MATRIX_VERSION,
            fingerprint: fingerprint.into(),
            created_at: Utc::now(),
            matrix,
        }
    }

    pub fn is_current_version(&self) -> bool {
        self.version == DISTANCE_MATRIX_VERSION && self.matrix.version == DISTANCE_MATRIX_VERSION
    }
}

/// Cache file for a run tag.
///
/// Format: `{output_dir}/distance_matrix_{tag}.json.gz`
pub fn matrix_cache_path(output_dir: &Path, tag: &str) -> PathBuf {
    output_dir.join(format!("distance_matrix_{}.json.gz", tag))
}

/// `.npy` export for a run tag.
///
/// Format: `{output_dir}/distance_matrix_{tag}.npy`
pub fn matrix_npy_path(output_dir: &Path, tag: &str) -> PathBuf {
    output_dir.join(format!("distance_matrix_{}.npy", tag))
}

/// Compress a cached matrix to gzip JSON bytes.
pub fn compress_matrix(cached: &CachedMatrix) -> StorageResult<Vec<u8>> {
    let json = serde_json::to_string(cached).map_err(|e| {
        StorageError::serialization(format!("Failed to serialize distance matrix: {}", e))
    })?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).map_err(|e| {
        StorageError::serialization(format!("Failed to gzip distance matrix: {}", e))
    })?;

    encoder.finish().map_err(|e| {
        StorageError::serialization(format!("Failed to finish gzip encoding: {}", e))
    })
}

/// Decompress gzip JSON bytes to a cached matrix.
///
/// Returns `None` if decompression or deserialization fails, if the
/// version is outdated, or if the stored matrix violates its invariants.
/// All of these are treated as cache misses.
pub fn decompress_matrix(data: &[u8]) -> Option<CachedMatrix> {
    let mut decoder = GzDecoder::new(data);
    let mut json = String::new();

    if let Err(e) = decoder.read_to_string(&mut json) {
        warn!(error = %e, "Failed to decompress distance matrix cache");
        return None;
    }

    let cached = match serde_json::from_str::<CachedMatrix>(&json) {
        Ok(cached) => cached,
        Err(e) => {
            warn!(error = %e, "Failed to deserialize distance matrix cache");
            return None;
        }
    };

    if !cached.is_current_version() {
        debug!(
            cached_version = cached.version,
            current_version = DISTANCE_MATRIX_VERSION,
            "Distance matrix cache version mismatch, treating as miss"
        );
        return None;
    }

    if let Err(e) = cached.matrix.validate() {
        warn!(error = %e, "Cached distance matrix is invalid, treating as miss");
        return None;
    }

    Some(cached)
}

/// Result of storing a matrix, including the compressed size.
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub path: PathBuf,
    pub compressed_size: u64,
}

/// Store a matrix in the cache file at `path`.
pub fn store_matrix(path: &Path, cached: &CachedMatrix) -> StorageResult<StoreResult> {
    let compressed = compress_matrix(cached)?;
    let compressed_size = compressed.len() as u64;

    debug!(
        path = %path.display(),
        motifs = cached.matrix.size(),
        compressed_size = compressed_size,
        "Storing distance matrix"
    );

    write_atomic(path, &compressed)?;

    Ok(StoreResult {
        path: path.to_path_buf(),
        compressed_size,
    })
}

/// Load a cached matrix if it exists and matches `fingerprint`.
///
/// Returns `None` on any miss: absent file, corrupt data, outdated
/// version or a fingerprint computed from different pools.
pub fn load_cached_matrix(path: &Path, fingerprint: &str) -> Option<DistanceMatrix> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Distance matrix cache miss (read failed)");
            return None;
        }
    };

    let cached = decompress_matrix(&data)?;
    if cached.fingerprint != fingerprint {
        debug!(
            path = %path.display(),
            cached = %cached.fingerprint,
            expected = %fingerprint,
            "Distance matrix cache miss (fingerprint mismatch)"
        );
        return None;
    }

    debug!(path = %path.display(), motifs = cached.matrix.size(), "Distance matrix cache hit");
    Some(cached.matrix)
}

/// Write the matrix values as a square float64 `.npy` array.
pub fn write_matrix_npy(path: &Path, matrix: &DistanceMatrix) -> StorageResult<()> {
    let n = matrix.size();
    let array = Array2::from_shape_vec((n, n), matrix.values().to_vec())
        .map_err(|e| StorageError::array_write(path, e.to_string()))?;

    write_npy(path, &array).map_err(|e| StorageError::array_write(path, e.to_string()))?;
    debug!(path = %path.display(), motifs = n, "Wrote distance matrix npy");
    Ok(())
}
