//! Filesystem storage for the motif community analysis.
//!
//! This crate provides:
//! - The per-video results directory layout
//! - Loading latent embeddings and motif labels (`.npy`) with per-video outcomes
//! - Motif-list and video-list text files
//! - Distance matrix cache (gzip-compressed JSON) and `.npy` export

pub mod error;
pub mod fs_utils;
pub mod layout;
pub mod lists;
pub mod loader;
pub mod matrix_cache;

pub use error::{StorageError, StorageResult};
pub use fs_utils::{ensure_directory_exists, write_atomic};
pub use layout::DataLayout;
pub use lists::{list_video_dirs, read_motif_list, save_list_to_file, write_motif_list};
pub use loader::{load_latents_and_labels, load_video, LoadReport, VideoArrays};
pub use matrix_cache::{
    compress_matrix, decompress_matrix, load_cached_matrix, matrix_cache_path, matrix_npy_path,
    store_matrix, write_matrix_npy, CachedMatrix, StoreResult as MatrixStoreResult,
};
