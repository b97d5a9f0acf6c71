//! Player profile and runtime position

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{PlayerId, SessionId, ZoneId};

/// Walking speed used when no profile overrides it (meters per hour).
pub const DEFAULT_MOVE_SPEED: u32 = 4500;

/// A player's position on the world map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub z: i64,
    pub zone_id: ZoneId,
}

impl Position {
    pub fn new(x: i64, y: i64, z: i64, zone_id: ZoneId) -> Self {
        Self { x, y, z, zone_id }
    }

    /// The world origin, inside the zone that would be generated there.
    pub fn origin() -> Self {
        Self::new(0, 0, 0, ZoneId::from_coords(0, 0, 0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    #[default]
    Player,
    Npc,
    Monster,
}

/// Profile data that rarely changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStaticData {
    #[serde(default = "default_player_id")]
    pub player_id: PlayerId,
    #[serde(default = "default_player_name")]
    pub name: String,
    /// Meters per hour. The field name is kept for save compatibility.
    #[serde(default = "default_move_speed")]
    pub move_speed_mph: u32,
    #[serde(default)]
    pub role_type: RoleType,
}

fn default_player_id() -> PlayerId {
    PlayerId::from("player_001")
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_move_speed() -> u32 {
    DEFAULT_MOVE_SPEED
}

impl Default for PlayerStaticData {
    fn default() -> Self {
        Self {
            player_id: default_player_id(),
            name: default_player_name(),
            move_speed_mph: DEFAULT_MOVE_SPEED,
            role_type: RoleType::Player,
        }
    }
}

impl PlayerStaticData {
    /// Check the profile before it replaces the stored one.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.player_id.as_str().trim().is_empty() {
            return Err(DomainError::validation("Player ID cannot be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Player name cannot be empty"));
        }
        if self.move_speed_mph == 0 {
            return Err(DomainError::validation("Move speed must be positive"));
        }
        Ok(())
    }
}

/// Per-session runtime data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRuntimeData {
    pub session_id: SessionId,
    #[serde(default)]
    pub current_position: Option<Position>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerRuntimeData {
    pub fn new(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            current_position: Some(Position::origin()),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_defaults_fill_missing_fields() {
        let data: PlayerStaticData = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(data, PlayerStaticData::default());
        assert_eq!(data.move_speed_mph, 4500);
        assert_eq!(data.player_id.as_str(), "player_001");
    }

    #[test]
    fn validate_rejects_zero_speed_and_blank_name() {
        let mut data = PlayerStaticData::default();
        assert!(data.validate().is_ok());
        data.move_speed_mph = 0;
        assert!(data.validate().is_err());
        data.move_speed_mph = 10;
        data.name = "  ".to_string();
        assert!(data.validate().is_err());
    }
}
