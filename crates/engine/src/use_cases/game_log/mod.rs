//! Game log use cases: append, list and tune how much history the
//! generation collaborator sees.

use std::sync::Arc;

use wrldkeep_domain::{GameLogEntry, GameLogSettings, LogPayload, SessionId};

use crate::stores::SessionStore;
use crate::use_cases::EngineError;

/// Upper bound on entries returned by one list call.
pub const MAX_LIST_LIMIT: usize = 200;

/// Container for game log use cases.
pub struct GameLogUseCases {
    pub add: Arc<AddGameLog>,
    pub list: Arc<ListGameLogs>,
    pub settings: Arc<GameLogSettingsOps>,
}

impl GameLogUseCases {
    pub fn new(
        add: Arc<AddGameLog>,
        list: Arc<ListGameLogs>,
        settings: Arc<GameLogSettingsOps>,
    ) -> Self {
        Self {
            add,
            list,
            settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddGameLogInput {
    pub session_id: SessionId,
    pub kind: String,
    pub message: String,
    pub payload: LogPayload,
}

pub struct AddGameLog {
    sessions: Arc<SessionStore>,
}

impl AddGameLog {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, input: AddGameLogInput) -> Result<GameLogEntry, EngineError> {
        self.sessions
            .mutate(&input.session_id, move |save, now| {
                let entry = save.append_log(
                    input.kind.trim(),
                    input.message.trim(),
                    input.payload,
                    now,
                );
                entry.validate()?;
                Ok(entry)
            })
            .await
    }
}

pub struct ListGameLogs {
    sessions: Arc<SessionStore>,
}

impl ListGameLogs {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Newest entries, oldest first. Without `limit` the session's
    /// `ai_fetch_limit` applies; the result never exceeds 200 entries.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        limit: Option<usize>,
    ) -> Result<Vec<GameLogEntry>, EngineError> {
        let save = self.sessions.snapshot(session_id).await?;
        let limit = effective_limit(limit, save.game_log_settings);
        Ok(save.recent_logs(limit).to_vec())
    }
}

/// `max(1, min(limit or ai_fetch_limit, 200))`
pub fn effective_limit(limit: Option<usize>, settings: GameLogSettings) -> usize {
    limit
        .unwrap_or(settings.ai_fetch_limit as usize)
        .min(MAX_LIST_LIMIT)
        .max(1)
}

/// Read and update [`GameLogSettings`].
pub struct GameLogSettingsOps {
    sessions: Arc<SessionStore>,
}

impl GameLogSettingsOps {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn get(&self, session_id: &SessionId) -> Result<GameLogSettings, EngineError> {
        Ok(self.sessions.snapshot(session_id).await?.game_log_settings)
    }

    pub async fn set(
        &self,
        session_id: &SessionId,
        ai_fetch_limit: u32,
    ) -> Result<GameLogSettings, EngineError> {
        let settings = GameLogSettings::new(ai_fetch_limit)?;
        self.sessions
            .mutate(session_id, move |save, _now| {
                save.game_log_settings = settings;
                Ok(settings)
            })
            .await
    }
}
