//! Crash-safe file writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::infrastructure::ports::StoreError;

/// Write `bytes` to `path` so readers see either the old or the new content.
///
/// Writes a sibling temp file, fsyncs it, renames it over `path`, then fsyncs
/// the parent directory so the rename itself is durable.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| StoreError::io("create_dir", parent, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{file_name}.tmp"));
    {
        let mut file = File::create(&tmp_path).map_err(|e| StoreError::io("create", &tmp_path, e))?;
        file.write_all(bytes)
            .map_err(|e| StoreError::io("write", &tmp_path, e))?;
        file.sync_all()
            .map_err(|e| StoreError::io("fsync", &tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| StoreError::io("rename", path, e))?;
    fsync_directory(parent);
    Ok(())
}

/// Best effort: not every platform lets a directory be opened for syncing.
fn fsync_directory(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        if let Err(e) = handle.sync_all() {
            tracing::trace!(path = %dir.display(), error = %e, "Directory fsync skipped");
        }
    }
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io("read", path, e)),
    }
}
