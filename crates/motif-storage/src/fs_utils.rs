//! Filesystem helpers for output artifacts.
//!
//! Artifacts are written to a sibling temp file first and renamed into
//! place, so a crashed run never leaves a truncated matrix or list behind.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::StorageResult;

/// Ensure a directory exists, creating it (and parents) if needed.
///
/// Returns `true` if the directory was created by this call.
pub fn ensure_directory_exists(dir: impl AsRef<Path>) -> StorageResult<bool> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        info!(dir = %dir.display(), "Output directory already exists");
        return Ok(false);
    }

    fs::create_dir_all(dir)?;
    info!(dir = %dir.display(), "Output directory created");
    Ok(true)
}

/// Write `bytes` to `dst` through a temp file in the same directory.
pub fn write_atomic(dst: impl AsRef<Path>, bytes: &[u8]) -> StorageResult<()> {
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = dst.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_dst = dst.with_file_name(tmp_name);

    fs::write(&tmp_dst, bytes)?;

    if let Err(e) = fs::rename(&tmp_dst, dst) {
        // Clean up temp file on failure
        let _ = fs::remove_file(&tmp_dst);
        return Err(e.into());
    }

    debug!(path = %dst.display(), bytes = bytes.len(), "Wrote artifact");
    Ok(())
}
