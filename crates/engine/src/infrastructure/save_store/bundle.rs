//! On-disk bundle format: pointer, manifest and content-addressed shards.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wrldkeep_domain::{
    AreaSnapshot, GameLogEntry, GameLogSettings, MapSnapshot, PlayerRuntimeData,
    PlayerStaticData, SaveFile, SessionId,
};

use crate::infrastructure::ports::StoreError;

pub(crate) const BUNDLE_FORMAT: &str = "save_bundle_v1";
pub(crate) const BUNDLE_FORMAT_VERSION: u32 = 1;
pub(crate) const MANIFEST_FILE: &str = "manifest.json";

pub(crate) const SHARD_META: &str = "meta";
pub(crate) const SHARD_MAP: &str = "map_snapshot";
pub(crate) const SHARD_AREA: &str = "area_snapshot";
pub(crate) const SHARD_PLAYER: &str = "player_data";
pub(crate) const SHARD_LOGS: &str = "game_logs";

pub(crate) const SHARD_NAMES: [&str; 5] =
    [SHARD_META, SHARD_MAP, SHARD_AREA, SHARD_PLAYER, SHARD_LOGS];

/// Hex characters of the digest used in shard file names.
const FILE_HASH_PREFIX: usize = 16;

// =============================================================================
// Pointer and manifest
// =============================================================================

/// The per-session entry point, `<session_id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Pointer {
    pub format: String,
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dir: Option<String>,
    pub session_id: SessionId,
    pub updated_at: DateTime<Utc>,
}

impl Pointer {
    pub fn new(session_id: SessionId, bundle_dir: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            format: BUNDLE_FORMAT.to_string(),
            format_version: BUNDLE_FORMAT_VERSION,
            bundle_dir: Some(bundle_dir),
            session_id,
            updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ShardEntry {
    pub hash: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Manifest {
    pub format: String,
    pub format_version: u32,
    pub updated_at: DateTime<Utc>,
    pub shards: BTreeMap<String, ShardEntry>,
}

impl Manifest {
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            format: BUNDLE_FORMAT.to_string(),
            format_version: BUNDLE_FORMAT_VERSION,
            updated_at,
            shards: BTreeMap::new(),
        }
    }

    pub fn check_format(&self) -> Result<(), StoreError> {
        if self.format != BUNDLE_FORMAT || self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(StoreError::corruption(format!(
                "unsupported manifest format {} v{}",
                self.format, self.format_version
            )));
        }
        Ok(())
    }
}

/// A bundle directory must be a single plain name inside the sessions root.
pub(crate) fn is_safe_bundle_dir(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('\\')
}

// =============================================================================
// Shard payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MetaShard {
    version: String,
    session_id: SessionId,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    game_log_settings: GameLogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlayerShard {
    #[serde(default)]
    player_static_data: PlayerStaticData,
    player_runtime_data: PlayerRuntimeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogsShard {
    #[serde(default)]
    items: Vec<GameLogEntry>,
}

/// One serialized shard ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct EncodedShard {
    pub name: &'static str,
    pub bytes: Vec<u8>,
    pub hash: String,
}

impl EncodedShard {
    fn encode<T: Serialize>(name: &'static str, payload: &T) -> Result<Self, StoreError> {
        let bytes = canonical_json(payload)?;
        let hash = sha256_hex(&bytes);
        Ok(Self { name, bytes, hash })
    }

    /// Content-addressed file name, `{shard}.{hash[..16]}.json`.
    pub fn file_name(&self) -> String {
        shard_file_name(self.name, &self.hash)
    }
}

pub(crate) fn shard_file_name(name: &str, hash: &str) -> String {
    let prefix = hash.get(..FILE_HASH_PREFIX).unwrap_or(hash);
    format!("{name}.{prefix}.json")
}

/// Compact JSON with object keys in sorted order.
///
/// Going through `serde_json::Value` sorts keys because its map is a
/// `BTreeMap` unless `preserve_order` is enabled.
pub(crate) fn canonical_json<T: Serialize>(payload: &T) -> Result<Vec<u8>, StoreError> {
    let value = serde_json::to_value(payload).map_err(StoreError::serialization)?;
    serde_json::to_vec(&value).map_err(StoreError::serialization)
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Split a save into its five shards, in `SHARD_NAMES` order.
pub(crate) fn encode_shards(save: &SaveFile) -> Result<Vec<EncodedShard>, StoreError> {
    let meta = MetaShard {
        version: save.version.clone(),
        session_id: save.session_id.clone(),
        updated_at: save.updated_at,
        game_log_settings: save.game_log_settings,
    };
    let player = PlayerShard {
        player_static_data: save.player_static_data.clone(),
        player_runtime_data: save.player_runtime_data.clone(),
    };
    let logs = LogsShard {
        items: save.game_logs.clone(),
    };

    Ok(vec![
        EncodedShard::encode(SHARD_META, &meta)?,
        EncodedShard::encode(SHARD_MAP, &save.map_snapshot)?,
        EncodedShard::encode(SHARD_AREA, &save.area_snapshot)?,
        EncodedShard::encode(SHARD_PLAYER, &player)?,
        EncodedShard::encode(SHARD_LOGS, &logs)?,
    ])
}

fn decode_shard<T: DeserializeOwned>(
    shards: &BTreeMap<String, Vec<u8>>,
    name: &str,
) -> Result<T, StoreError> {
    let bytes = shards
        .get(name)
        .ok_or_else(|| StoreError::corruption(format!("shard {name} is missing")))?;
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::corruption(format!("shard {name} is unreadable: {e}")))
}

/// Rebuild a save from verified shard contents.
pub(crate) fn assemble(shards: &BTreeMap<String, Vec<u8>>) -> Result<SaveFile, StoreError> {
    let meta: MetaShard = decode_shard(shards, SHARD_META)?;
    let map_snapshot: MapSnapshot = decode_shard(shards, SHARD_MAP)?;
    let area_snapshot: AreaSnapshot = decode_shard(shards, SHARD_AREA)?;
    let player: PlayerShard = decode_shard(shards, SHARD_PLAYER)?;
    let logs: LogsShard = decode_shard(shards, SHARD_LOGS)?;

    Ok(SaveFile {
        version: meta.version,
        session_id: meta.session_id,
        map_snapshot,
        area_snapshot,
        game_logs: logs.items,
        game_log_settings: meta.game_log_settings,
        player_static_data: player.player_static_data,
        player_runtime_data: player.player_runtime_data,
        updated_at: meta.updated_at,
    })
}
