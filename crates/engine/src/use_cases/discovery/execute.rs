//! Execute an interaction. Execution is a placeholder: it costs one minute
//! and is logged, nothing else happens yet.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wrldkeep_domain::{log_kinds, InteractionId, LogPayload, SessionId, WorldClock};

use crate::stores::SessionStore;
use crate::use_cases::region::ensure_area;
use crate::use_cases::EngineError;

const INTERACTION_MINUTES: u32 = 1;
const PLACEHOLDER_STATUS: &str = "placeholder";

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteInteractionInput {
    pub session_id: SessionId,
    pub interaction_id: InteractionId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteInteractionResult {
    pub ok: bool,
    pub status: &'static str,
    pub interaction_id: InteractionId,
    pub message: String,
    pub clock_after: WorldClock,
}

pub struct ExecuteInteraction {
    sessions: Arc<SessionStore>,
}

impl ExecuteInteraction {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(
        &self,
        input: ExecuteInteractionInput,
    ) -> Result<ExecuteInteractionResult, EngineError> {
        self.sessions
            .mutate(&input.session_id, move |save, now| {
                ensure_area(save);
                let (sub_zone_id, name, status) = save
                    .area_snapshot
                    .find_interaction(&input.interaction_id)
                    .map(|(sub, interaction)| {
                        (sub.sub_zone_id.clone(), interaction.name.clone(), interaction.status)
                    })
                    .ok_or_else(|| {
                        EngineError::InvalidInteraction(format!(
                            "unknown interaction {}",
                            input.interaction_id
                        ))
                    })?;
                if !status.is_executable() {
                    return Err(EngineError::InvalidInteraction(format!(
                        "interaction {} is {}",
                        input.interaction_id, status
                    )));
                }

                let advanced = save.area_snapshot.advance_clock(INTERACTION_MINUTES, now)?;
                let message = format!(
                    "{} used {} (placeholder)",
                    save.player_static_data.name, name
                );
                let mut payload = LogPayload::new();
                payload.insert(
                    "interaction_id".into(),
                    Value::from(input.interaction_id.as_str()),
                );
                payload.insert("sub_zone_id".into(), Value::from(sub_zone_id.as_str()));
                save.append_log(log_kinds::AREA_INTERACTION, message.clone(), payload, now);

                tracing::info!(
                    session_id = %save.session_id,
                    interaction_id = %input.interaction_id,
                    "Executed placeholder interaction"
                );
                Ok(ExecuteInteractionResult {
                    ok: true,
                    status: PLACEHOLDER_STATUS,
                    interaction_id: input.interaction_id,
                    message,
                    clock_after: advanced.new_time,
                })
            })
            .await
    }
}
