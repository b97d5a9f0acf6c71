//! Player profile use cases.

use std::sync::Arc;

use wrldkeep_domain::{PlayerStaticData, SessionId};

use crate::stores::SessionStore;
use crate::use_cases::EngineError;

/// Container for player use cases.
pub struct PlayerUseCases {
    pub profile: Arc<PlayerProfile>,
}

impl PlayerUseCases {
    pub fn new(profile: Arc<PlayerProfile>) -> Self {
        Self { profile }
    }
}

/// Read and replace the player's static profile (name, speed, role).
pub struct PlayerProfile {
    sessions: Arc<SessionStore>,
}

impl PlayerProfile {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn get(&self, session_id: &SessionId) -> Result<PlayerStaticData, EngineError> {
        Ok(self.sessions.snapshot(session_id).await?.player_static_data)
    }

    pub async fn set(
        &self,
        session_id: &SessionId,
        profile: PlayerStaticData,
    ) -> Result<PlayerStaticData, EngineError> {
        profile.validate()?;
        self.sessions
            .mutate(session_id, move |save, _now| {
                tracing::debug!(
                    session_id = %save.session_id,
                    move_speed = profile.move_speed_mph,
                    "Updated player profile"
                );
                save.player_static_data = profile;
                Ok(save.player_static_data.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestStore;

    #[tokio::test]
    async fn profile_round_trips_and_validates() {
        let store = TestStore::new();
        let profile = PlayerProfile::new(Arc::clone(&store.sessions));
        let id = SessionId::default();

        assert_eq!(profile.get(&id).await.expect("get"), PlayerStaticData::default());

        let mut updated = PlayerStaticData {
            name: "Mira".to_string(),
            move_speed_mph: 6000,
            ..PlayerStaticData::default()
        };
        profile.set(&id, updated.clone()).await.expect("set");
        assert_eq!(profile.get(&id).await.expect("get"), updated);

        updated.move_speed_mph = 0;
        let err = profile.set(&id, updated).await.expect_err("zero speed");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
