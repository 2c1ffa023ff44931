//! Plain-text list files: the filtered motif list and video lists.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use tracing::debug;

use motif_models::{MotifId, MotifSet, VideoId};

use crate::error::{StorageError, StorageResult};
use crate::fs_utils::write_atomic;

/// Read the filtered motif list: one integer per line, order preserved.
///
/// Blank lines are skipped. Any other line that is not a non-negative
/// integer fails with its line number. Repeated ids are rejected.
pub fn read_motif_list(path: impl AsRef<Path>) -> StorageResult<MotifSet> {
    let path = path.as_ref();
    let content = read_existing(path)?;

    let mut ids = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let id: MotifId = trimmed
            .parse()
            .map_err(|e: motif_models::ModelError| StorageError::parse(path, line_no + 1, e.to_string()))?;
        ids.push(id);
    }

    let set = MotifSet::new(ids).map_err(|e| StorageError::InvalidMotifList(e.to_string()))?;
    debug!(path = %path.display(), motifs = set.len(), "Read filtered motif list");
    Ok(set)
}

/// Write a motif list in the same format [`read_motif_list`] reads.
pub fn write_motif_list(path: impl AsRef<Path>, motifs: &MotifSet) -> StorageResult<()> {
    save_list_to_file(path, motifs.iter())
}

/// Save items to a text file, one per line.
pub fn save_list_to_file<T: Display>(
    path: impl AsRef<Path>,
    items: impl IntoIterator<Item = T>,
) -> StorageResult<()> {
    let mut out = String::new();
    for item in items {
        out.push_str(&item.to_string());
        out.push('\n');
    }
    write_atomic(path, out.as_bytes())
}

/// List the video directories under the data root, sorted by name.
///
/// Plain files in the data root are ignored.
pub fn list_video_dirs(data_dir: impl AsRef<Path>) -> StorageResult<Vec<VideoId>> {
    let data_dir = data_dir.as_ref();
    if !data_dir.is_dir() {
        return Err(StorageError::not_found(data_dir));
    }

    let mut videos = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            videos.push(VideoId::from(name));
        }
    }
    videos.sort();

    debug!(data_dir = %data_dir.display(), videos = videos.len(), "Listed video directories");
    Ok(videos)
}

fn read_existing(path: &Path) -> StorageResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::not_found(path)),
        Err(e) => Err(e.into()),
    }
}
