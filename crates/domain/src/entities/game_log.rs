//! Game log entries - The session's append-only activity record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::SessionId;

/// Flat payload values attached to a log entry.
pub type LogPayload = serde_json::Map<String, serde_json::Value>;

/// Well-known entry kinds written by the engine itself.
pub mod kinds {
    pub const AREA_GENERATE: &str = "area_generate";
    pub const MOVE: &str = "move";
    pub const AREA_MOVE: &str = "area_move";
    pub const AREA_REFRESH: &str = "area_refresh";
    pub const AREA_INTERACTION: &str = "area_interaction_placeholder";
    pub const CLOCK_INIT: &str = "clock_init";
}

const MIN_AI_FETCH_LIMIT: u32 = 1;
const MAX_AI_FETCH_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub id: String,
    pub session_id: SessionId,
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub payload: LogPayload,
    pub created_at: DateTime<Utc>,
}

impl GameLogEntry {
    /// Build an entry. `sequence` disambiguates entries created in the same millisecond.
    pub fn new(
        session_id: SessionId,
        kind: impl Into<String>,
        message: impl Into<String>,
        payload: LogPayload,
        sequence: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("glog_{}_{}", now.timestamp_millis(), sequence),
            session_id,
            kind: kind.into(),
            message: message.into(),
            payload,
            created_at: now,
        }
    }

    /// Entries added by callers need a kind and a message.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.kind.trim().is_empty() {
            return Err(DomainError::validation("Log kind cannot be empty"));
        }
        if self.message.trim().is_empty() {
            return Err(DomainError::validation("Log message cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogSettings {
    /// How many recent entries are handed to the generation collaborator.
    #[serde(default = "default_ai_fetch_limit")]
    pub ai_fetch_limit: u32,
}

fn default_ai_fetch_limit() -> u32 {
    10
}

impl Default for GameLogSettings {
    fn default() -> Self {
        Self {
            ai_fetch_limit: default_ai_fetch_limit(),
        }
    }
}

impl GameLogSettings {
    pub fn new(ai_fetch_limit: u32) -> Result<Self, DomainError> {
        if !(MIN_AI_FETCH_LIMIT..=MAX_AI_FETCH_LIMIT).contains(&ai_fetch_limit) {
            return Err(DomainError::validation(format!(
                "ai_fetch_limit must be between {} and {}",
                MIN_AI_FETCH_LIMIT, MAX_AI_FETCH_LIMIT
            )));
        }
        Ok(Self { ai_fetch_limit })
    }
}
