//! File-backed save persistence.
//!
//! Each session is stored as a pointer file plus a bundle directory:
//!
//! ```text
//! <root>/<session_id>.json                pointer
//! <root>/<session_id>.json.bundle/
//!     manifest.json                       shard name -> {hash, file}
//!     meta.<hash16>.json                  one file per shard
//!     map_snapshot.<hash16>.json
//!     ...
//! ```
//!
//! Shard files are content addressed, so a commit only writes shards whose
//! content changed. The manifest and then the pointer are replaced atomically;
//! shard files no longer referenced are pruned afterwards. A pointer without a
//! `bundle_dir` is a legacy save holding the whole aggregate.

mod bundle;
mod fs;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use wrldkeep_domain::{SaveFile, SessionId};

use crate::infrastructure::ports::{CommitReport, SaveRepo, StoreError};

use bundle::{Manifest, Pointer, ShardEntry, MANIFEST_FILE};

/// Save store rooted at a sessions directory.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pointer_path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!("{session_id}.json"))
    }

    fn bundle_dir_name(session_id: &SessionId) -> String {
        format!("{session_id}.json.bundle")
    }

    /// Previous manifest, if one exists and parses. An unreadable manifest
    /// only means nothing can be reused.
    fn previous_manifest(bundle_dir: &Path) -> Option<Manifest> {
        let path = bundle_dir.join(MANIFEST_FILE);
        let bytes = match fs::read_optional(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Previous manifest unreadable, rewriting all shards");
                return None;
            }
        };
        match serde_json::from_slice::<Manifest>(&bytes) {
            Ok(manifest) if manifest.check_format().is_ok() => Some(manifest),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %path.display(), "Previous manifest invalid, rewriting all shards");
                None
            }
        }
    }

    fn load_bundle(&self, pointer: &Pointer, bundle_dir: &str) -> Result<SaveFile, StoreError> {
        if pointer.format != bundle::BUNDLE_FORMAT
            || pointer.format_version != bundle::BUNDLE_FORMAT_VERSION
        {
            return Err(StoreError::corruption(format!(
                "unsupported pointer format {} v{}",
                pointer.format, pointer.format_version
            )));
        }
        if !bundle::is_safe_bundle_dir(bundle_dir) {
            return Err(StoreError::corruption(format!(
                "bundle_dir {bundle_dir:?} escapes the save directory"
            )));
        }

        let dir = self.root.join(bundle_dir);
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest_bytes = fs::read_optional(&manifest_path)?
            .ok_or_else(|| StoreError::corruption(format!("{} is missing", manifest_path.display())))?;
        let manifest: Manifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| StoreError::corruption(format!("manifest is unreadable: {e}")))?;
        manifest.check_format()?;

        let mut shards = BTreeMap::new();
        for name in bundle::SHARD_NAMES {
            let entry = manifest
                .shards
                .get(name)
                .ok_or_else(|| StoreError::corruption(format!("manifest has no {name} shard")))?;
            if !bundle::is_safe_bundle_dir(&entry.file) {
                return Err(StoreError::corruption(format!(
                    "shard file {:?} escapes the bundle",
                    entry.file
                )));
            }
            let path = dir.join(&entry.file);
            let bytes = fs::read_optional(&path)?.ok_or_else(|| {
                StoreError::corruption(format!("shard file {} is missing", path.display()))
            })?;
            let actual = bundle::sha256_hex(&bytes);
            if actual != entry.hash {
                return Err(StoreError::corruption(format!(
                    "shard {name} hash mismatch: manifest {}, file {}",
                    entry.hash, actual
                )));
            }
            shards.insert(name.to_string(), bytes);
        }

        bundle::assemble(&shards)
    }

    /// Remove files in the bundle that the current manifest does not reference.
    fn prune(bundle_dir: &Path, manifest: &Manifest) -> usize {
        let entries = match std::fs::read_dir(bundle_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %bundle_dir.display(), error = %e, "Skipping shard pruning");
                return 0;
            }
        };

        let mut pruned = 0;
        for entry in entries.filter_map(Result::ok) {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let referenced = file_name == MANIFEST_FILE
                || manifest.shards.values().any(|s| s.file == file_name);
            if referenced || !entry.path().is_file() {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => pruned += 1,
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Failed to prune stale shard")
                }
            }
        }
        pruned
    }
}

impl SaveRepo for SaveStore {
    fn load(&self, session_id: &SessionId) -> Result<Option<SaveFile>, StoreError> {
        let pointer_path = self.pointer_path(session_id);
        let Some(bytes) = fs::read_optional(&pointer_path)? else {
            return Ok(None);
        };

        let raw: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corruption(format!("pointer is unreadable: {e}")))?;

        let bundle_dir = raw
            .get("bundle_dir")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let save = match bundle_dir {
            Some(dir) => {
                let pointer: Pointer = serde_json::from_value(raw)
                    .map_err(|e| StoreError::corruption(format!("pointer is invalid: {e}")))?;
                self.load_bundle(&pointer, &dir)?
            }
            None => {
                tracing::debug!(session_id = %session_id, "Loading legacy save");
                serde_json::from_value::<SaveFile>(raw)
                    .map_err(|e| StoreError::corruption(format!("legacy save is invalid: {e}")))?
            }
        };
        Ok(Some(save))
    }

    fn commit(&self, save: &SaveFile, force: bool) -> Result<CommitReport, StoreError> {
        let dir_name = Self::bundle_dir_name(&save.session_id);
        let bundle_dir = self.root.join(&dir_name);
        let previous = if force {
            None
        } else {
            Self::previous_manifest(&bundle_dir)
        };

        let mut report = CommitReport::default();
        let mut manifest = Manifest::new(save.updated_at);
        for shard in bundle::encode_shards(save)? {
            let file = shard.file_name();
            let unchanged = previous
                .as_ref()
                .and_then(|m| m.shards.get(shard.name))
                .is_some_and(|prev| prev.hash == shard.hash && bundle_dir.join(&prev.file).is_file());

            if unchanged {
                report.reused.push(shard.name.to_string());
            } else {
                fs::write_atomic(&bundle_dir.join(&file), &shard.bytes)?;
                report.written.push(shard.name.to_string());
            }
            manifest.shards.insert(
                shard.name.to_string(),
                ShardEntry {
                    hash: shard.hash,
                    file,
                },
            );
        }

        let manifest_bytes = serde_json::to_vec_pretty(&manifest).map_err(StoreError::serialization)?;
        fs::write_atomic(&bundle_dir.join(MANIFEST_FILE), &manifest_bytes)?;

        let pointer = Pointer::new(save.session_id.clone(), dir_name, save.updated_at);
        let pointer_bytes = serde_json::to_vec_pretty(&pointer).map_err(StoreError::serialization)?;
        fs::write_atomic(&self.pointer_path(&save.session_id), &pointer_bytes)?;

        report.pruned = Self::prune(&bundle_dir, &manifest);

        tracing::debug!(
            session_id = %save.session_id,
            written = ?report.written,
            reused = report.reused.len(),
            pruned = report.pruned,
            force,
            "Save committed"
        );
        Ok(report)
    }
}
