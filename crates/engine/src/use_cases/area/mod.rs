//! Read the navigable area.

use std::sync::Arc;

use wrldkeep_domain::{AreaSnapshot, SessionId};

use crate::stores::SessionStore;
use crate::use_cases::region::ensure_area;
use crate::use_cases::EngineError;

/// Container for area use cases.
pub struct AreaUseCases {
    pub get_current: Arc<GetCurrentArea>,
}

impl AreaUseCases {
    pub fn new(get_current: Arc<GetCurrentArea>) -> Self {
        Self { get_current }
    }
}

pub struct GetCurrentArea {
    sessions: Arc<SessionStore>,
}

impl GetCurrentArea {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// The session's area snapshot.
    ///
    /// A save that has a map but no area view (older saves) gets one
    /// materialized and persisted on first read.
    pub async fn execute(&self, session_id: &SessionId) -> Result<AreaSnapshot, EngineError> {
        let mut snapshot = self.sessions.snapshot(session_id).await?;
        if !ensure_area(&mut snapshot) {
            return Ok(snapshot.area_snapshot);
        }
        self.sessions
            .mutate(session_id, |save, _now| {
                ensure_area(save);
                Ok(save.area_snapshot.clone())
            })
            .await
    }
}
