//! Save file aggregate - Everything persisted for one session
//!
//! The save store splits this aggregate into shards on disk; in memory it is
//! always handled whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AreaSnapshot, MapSnapshot};
use crate::entities::{
    GameLogEntry, GameLogSettings, LogPayload, PlayerRuntimeData, PlayerStaticData,
};
use crate::error::DomainError;
use crate::ids::SessionId;

/// Save format version written by this crate.
pub const SAVE_VERSION: &str = "1.1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default = "default_save_version")]
    pub version: String,
    pub session_id: SessionId,
    #[serde(default)]
    pub map_snapshot: MapSnapshot,
    #[serde(default)]
    pub area_snapshot: AreaSnapshot,
    #[serde(default)]
    pub game_logs: Vec<GameLogEntry>,
    #[serde(default)]
    pub game_log_settings: GameLogSettings,
    #[serde(default)]
    pub player_static_data: PlayerStaticData,
    pub player_runtime_data: PlayerRuntimeData,
    pub updated_at: DateTime<Utc>,
}

fn default_save_version() -> String {
    SAVE_VERSION.to_string()
}

impl SaveFile {
    /// A fresh aggregate: no map, no clock, player at the origin.
    pub fn empty(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            version: default_save_version(),
            session_id: session_id.clone(),
            map_snapshot: MapSnapshot::default(),
            area_snapshot: AreaSnapshot::default(),
            game_logs: Vec::new(),
            game_log_settings: GameLogSettings::default(),
            player_static_data: PlayerStaticData::default(),
            player_runtime_data: PlayerRuntimeData::new(session_id, now),
            updated_at: now,
        }
    }

    /// Append a log entry and return a copy of it.
    pub fn append_log(
        &mut self,
        kind: impl Into<String>,
        message: impl Into<String>,
        payload: LogPayload,
        now: DateTime<Utc>,
    ) -> GameLogEntry {
        let entry = GameLogEntry::new(
            self.session_id.clone(),
            kind,
            message,
            payload,
            self.game_logs.len() + 1,
            now,
        );
        self.game_logs.push(entry.clone());
        entry
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent_logs(&self, limit: usize) -> &[GameLogEntry] {
        let start = self.game_logs.len().saturating_sub(limit);
        &self.game_logs[start..]
    }

    /// Stamp the aggregate as changed.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.player_runtime_data.updated_at = now;
    }

    /// Invariants that must hold before the aggregate is persisted.
    ///
    /// Zone radii must sit inside their size class, and the area snapshot must
    /// pass its own checks.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        if self.player_runtime_data.session_id != self.session_id {
            return Err(DomainError::invariant(format!(
                "runtime data belongs to session {}, save belongs to {}",
                self.player_runtime_data.session_id, self.session_id
            )));
        }
        for zone in &self.map_snapshot.zones {
            if !zone.size.contains_radius(zone.radius_m) {
                return Err(DomainError::invariant(format!(
                    "zone {} radius {} m is outside the {} range",
                    zone.zone_id, zone.radius_m, zone.size
                )));
            }
        }
        for zone in &self.area_snapshot.zones {
            if !zone.size.contains_radius(zone.radius_m) {
                return Err(DomainError::invariant(format!(
                    "zone {} radius {} m is outside the {} range",
                    zone.zone_id, zone.radius_m, zone.size
                )));
            }
        }
        self.area_snapshot.check_invariants()
    }
}
