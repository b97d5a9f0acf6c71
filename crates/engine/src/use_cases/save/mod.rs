//! Whole-save operations: read, replace and clear.

use std::sync::Arc;

use serde::Serialize;
use wrldkeep_domain::{DomainError, GameLogSettings, SaveFile, SessionId};

use crate::infrastructure::ports::CommitReport;
use crate::stores::SessionStore;
use crate::use_cases::EngineError;

/// Container for save use cases.
pub struct SaveUseCases {
    pub get: Arc<GetSave>,
    pub put: Arc<PutSave>,
    pub clear: Arc<ClearSave>,
}

impl SaveUseCases {
    pub fn new(get: Arc<GetSave>, put: Arc<PutSave>, clear: Arc<ClearSave>) -> Self {
        Self { get, put, clear }
    }
}

// =============================================================================
// Get
// =============================================================================

pub struct GetSave {
    sessions: Arc<SessionStore>,
}

impl GetSave {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// The stored aggregate, or a fresh default when nothing was saved yet.
    pub async fn execute(&self, session_id: &SessionId) -> Result<SaveFile, EngineError> {
        self.sessions.snapshot(session_id).await
    }
}

// =============================================================================
// Put
// =============================================================================

pub struct PutSave {
    sessions: Arc<SessionStore>,
}

impl PutSave {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Replace the session aggregate with a caller-supplied one.
    ///
    /// # Errors
    ///
    /// - `SessionMismatch` when `save` belongs to another session
    /// - `InvalidGeneratedContent` when `save` breaks a world invariant or
    ///   would move the clock backwards
    pub async fn execute(
        &self,
        session_id: &SessionId,
        save: SaveFile,
    ) -> Result<SaveFile, EngineError> {
        if &save.session_id != session_id {
            return Err(EngineError::SessionMismatch(format!(
                "save belongs to {}, request targets {}",
                save.session_id, session_id
            )));
        }
        validate_incoming(&save)?;

        self.sessions
            .mutate(session_id, move |current, now| {
                if let Some(existing) = &current.area_snapshot.clock {
                    let rewinds = match &save.area_snapshot.clock {
                        Some(incoming) => incoming.absolute_minutes() < existing.absolute_minutes(),
                        None => true,
                    };
                    if rewinds {
                        return Err(EngineError::InvalidGeneratedContent(format!(
                            "world clock cannot move back from {existing}"
                        )));
                    }
                }
                *current = save;
                current.touch(now);
                tracing::info!(session_id = %current.session_id, "Replaced save");
                Ok(current.clone())
            })
            .await
    }
}

fn validate_incoming(save: &SaveFile) -> Result<(), EngineError> {
    let invalid = |e: DomainError| EngineError::InvalidGeneratedContent(e.to_string());
    save.check_invariants().map_err(invalid)?;
    save.player_static_data.validate().map_err(invalid)?;
    GameLogSettings::new(save.game_log_settings.ai_fetch_limit).map_err(invalid)?;
    if let Some(sub_id) = &save.area_snapshot.current_sub_zone_id {
        let owner = save.area_snapshot.sub_zone(sub_id).map(|s| &s.zone_id);
        if owner.is_none() || owner != save.area_snapshot.current_zone_id.as_ref() {
            return Err(EngineError::InvalidGeneratedContent(format!(
                "current sub-zone {sub_id} is not inside the current zone"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Clear
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearSaveResult {
    pub save: SaveFile,
    pub commit: CommitReport,
}

pub struct ClearSave {
    sessions: Arc<SessionStore>,
}

impl ClearSave {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Reset the session to a fresh default and rewrite every shard.
    ///
    /// The stored save is never read, so a corrupted or foreign save can
    /// always be cleared.
    pub async fn execute(&self, session_id: &SessionId) -> Result<ClearSaveResult, EngineError> {
        let (save, commit) = self.sessions.reset(session_id).await?;
        tracing::info!(
            session_id = %session_id,
            shards_written = commit.written.len(),
            "Cleared save"
        );
        Ok(ClearSaveResult { save, commit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::SaveRepo;
    use crate::test_fixtures::{fixed_now, two_villages, TestStore};
    use wrldkeep_domain::{CalendarId, SubZoneId, WorldClock, ZoneId};

    #[tokio::test]
    async fn get_returns_default_for_new_session() {
        let store = TestStore::new();
        let use_case = GetSave::new(Arc::clone(&store.sessions));

        let save = use_case.execute(&SessionId::default()).await.expect("get");
        assert!(save.map_snapshot.zones.is_empty());
        assert!(store.repo.load(&SessionId::default()).expect("load").is_none());
    }

    #[tokio::test]
    async fn put_replaces_and_persists() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        let mut incoming = store.sessions.snapshot(&id).await.expect("snapshot");
        incoming.player_static_data.name = "Mira".to_string();

        let use_case = PutSave::new(Arc::clone(&store.sessions));
        let saved = use_case.execute(&id, incoming).await.expect("put");
        assert_eq!(saved.player_static_data.name, "Mira");

        let persisted = store.repo.load(&id).expect("load").expect("present");
        assert_eq!(persisted, saved);
    }

    #[tokio::test]
    async fn put_rejects_other_session() {
        let store = TestStore::new();
        let other = SessionId::new("sess_other").expect("valid id");
        let incoming = SaveFile::empty(other, chrono::Utc::now());

        let use_case = PutSave::new(Arc::clone(&store.sessions));
        let err = use_case
            .execute(&SessionId::default(), incoming)
            .await
            .expect_err("mismatch");
        assert_eq!(err.code(), "SESSION_MISMATCH");
    }

    #[tokio::test]
    async fn put_rejects_broken_invariants() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        let use_case = PutSave::new(Arc::clone(&store.sessions));

        let mut outside = store.sessions.snapshot(&id).await.expect("snapshot");
        outside.area_snapshot.sub_zones[0].coord.x += 5000.0;
        let err = use_case.execute(&id, outside).await.expect_err("outside radius");
        assert_eq!(err.code(), "INVALID_GENERATED_CONTENT");

        let mut stray = store.sessions.snapshot(&id).await.expect("snapshot");
        stray.area_snapshot.current_zone_id = Some(ZoneId::from("zone_600_0_0"));
        stray.area_snapshot.current_sub_zone_id = Some(SubZoneId::from("sub_zone_0_0_0_1"));
        let err = use_case.execute(&id, stray).await.expect_err("wrong zone");
        assert_eq!(err.code(), "INVALID_GENERATED_CONTENT");
    }

    #[tokio::test]
    async fn put_cannot_rewind_the_clock() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        store
            .sessions
            .mutate(&id, |save, now| {
                save.area_snapshot.advance_clock(60, now)?;
                Ok(())
            })
            .await
            .expect("advance");

        let mut incoming = store.sessions.snapshot(&id).await.expect("snapshot");
        incoming.area_snapshot.clock = Some(WorldClock::starting(
            CalendarId::default(),
            chrono::Utc::now(),
        ));
        let use_case = PutSave::new(Arc::clone(&store.sessions));
        let err = use_case.execute(&id, incoming).await.expect_err("rewind");
        assert_eq!(err.code(), "INVALID_GENERATED_CONTENT");
    }

    #[tokio::test]
    async fn clear_resets_and_rewrites_every_shard() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        let use_case = ClearSave::new(Arc::clone(&store.sessions));

        let result = use_case.execute(&id).await.expect("clear");
        assert_eq!(result.commit.written.len(), 5);
        assert!(result.commit.reused.is_empty());
        assert!(result.save.map_snapshot.zones.is_empty());
        assert!(result.save.area_snapshot.clock.is_none());

        let persisted = store.repo.load(&id).expect("load").expect("present");
        assert_eq!(persisted, result.save);
    }

    /// A second store over the same directory, with a cold cache.
    fn reopen(store: &TestStore) -> Arc<SessionStore> {
        Arc::new(SessionStore::new(
            Arc::clone(&store.repo) as Arc<dyn SaveRepo>,
            Arc::new(FixedClock(fixed_now())),
        ))
    }

    async fn assert_clears_to_empty(store: &TestStore, sessions: Arc<SessionStore>) {
        let id = SessionId::default();
        let use_case = ClearSave::new(Arc::clone(&sessions));
        use_case.execute(&id).await.expect("clear");
        use_case.execute(&id).await.expect("clear again");

        let persisted = store.repo.load(&id).expect("readable").expect("present");
        assert_eq!(persisted.session_id, id);
        assert!(persisted.area_snapshot.clock.is_none());
        assert!(persisted.map_snapshot.zones.is_empty());
        assert!(persisted.game_logs.is_empty());
        assert_eq!(sessions.snapshot(&id).await.expect("snapshot"), persisted);
    }

    #[tokio::test]
    async fn clear_recovers_from_tampered_shards() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;

        let bundle = store.dir.path().join("sess_default.json.bundle");
        for entry in std::fs::read_dir(&bundle).expect("bundle dir") {
            let path = entry.expect("entry").path();
            if path.file_name().is_some_and(|n| n != "manifest.json") {
                std::fs::write(&path, br#"{"tampered":1}"#).expect("tamper");
            }
        }

        let sessions = reopen(&store);
        let err = sessions.snapshot(&id).await.expect_err("corrupted");
        assert_eq!(err.code(), "STORAGE_CORRUPTION");

        assert_clears_to_empty(&store, sessions).await;
    }

    #[tokio::test]
    async fn clear_recovers_from_missing_manifest() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        std::fs::remove_file(
            store
                .dir
                .path()
                .join("sess_default.json.bundle")
                .join("manifest.json"),
        )
        .expect("remove manifest");

        let sessions = reopen(&store);
        let err = sessions.snapshot(&id).await.expect_err("corrupted");
        assert_eq!(err.code(), "STORAGE_CORRUPTION");

        assert_clears_to_empty(&store, sessions).await;
    }

    #[tokio::test]
    async fn clear_replaces_a_save_from_another_session() {
        let store = TestStore::new();
        let other = SessionId::new("sess_other").expect("valid id");
        store
            .repo
            .commit(&SaveFile::empty(other.clone(), fixed_now()), false)
            .expect("commit other");
        std::fs::copy(
            store.dir.path().join("sess_other.json"),
            store.dir.path().join("sess_default.json"),
        )
        .expect("copy pointer");

        let sessions = reopen(&store);
        let err = sessions
            .snapshot(&SessionId::default())
            .await
            .expect_err("mismatch");
        assert_eq!(err.code(), "SESSION_MISMATCH");

        assert_clears_to_empty(&store, sessions).await;
        let untouched = store.repo.load(&other).expect("load other").expect("present");
        assert_eq!(untouched.session_id, other);
    }
}
