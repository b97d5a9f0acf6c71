//! Per-session aggregate handles.
//!
//! Every session gets its own async mutex, so at most one mutating operation
//! runs per session while different sessions never contend. The cached
//! aggregate is only replaced after its commit succeeded, so idle slots can
//! be dropped at any time and are reloaded from disk on next use.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use wrldkeep_domain::{SaveFile, SessionId};

use crate::infrastructure::ports::{ClockPort, CommitReport, SaveRepo};
use crate::use_cases::EngineError;

/// Slots kept before idle ones are evicted.
pub const DEFAULT_MAX_CACHED_SESSIONS: usize = 1024;

/// Cached state of one session; `None` until first loaded.
#[derive(Debug, Default)]
pub struct SessionSlot {
    save: Option<SaveFile>,
}

/// Keyed store of locked session aggregates backed by a [`SaveRepo`].
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<SessionSlot>>>,
    repo: Arc<dyn SaveRepo>,
    clock: Arc<dyn ClockPort>,
    max_cached: usize,
}

impl SessionStore {
    pub fn new(repo: Arc<dyn SaveRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            sessions: DashMap::new(),
            repo,
            clock,
            max_cached: DEFAULT_MAX_CACHED_SESSIONS,
        }
    }

    /// Cap the number of cached slots (at least one).
    pub fn with_max_cached(mut self, max_cached: usize) -> Self {
        self.max_cached = max_cached.max(1);
        self
    }

    /// Number of session slots currently held.
    pub fn cached_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn handle(&self, session_id: &SessionId) -> Arc<Mutex<SessionSlot>> {
        if self.sessions.len() >= self.max_cached && !self.sessions.contains_key(session_id) {
            self.evict_idle();
        }
        let entry = self.sessions.entry(session_id.clone()).or_default();
        Arc::clone(entry.value())
    }

    /// Drop slots no operation currently holds.
    ///
    /// A slot held only by the map has no operation in flight, and its cached
    /// aggregate is either persisted or a never-saved default.
    fn evict_idle(&self) {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| Arc::strong_count(slot) > 1);
        tracing::debug!(
            evicted = before - self.sessions.len(),
            remaining = self.sessions.len(),
            "Evicted idle session slots"
        );
    }

    /// Current aggregate for the slot, loading it on first access.
    async fn ensure_loaded(
        &self,
        slot: &mut SessionSlot,
        session_id: &SessionId,
    ) -> Result<SaveFile, EngineError> {
        if let Some(save) = &slot.save {
            return Ok(save.clone());
        }

        let repo = Arc::clone(&self.repo);
        let id = session_id.clone();
        let loaded = tokio::task::spawn_blocking(move || repo.load(&id)).await??;
        let save = match loaded {
            Some(save) if &save.session_id != session_id => {
                return Err(EngineError::SessionMismatch(format!(
                    "save for {} holds session {}",
                    session_id, save.session_id
                )));
            }
            Some(save) => save,
            None => {
                tracing::debug!(session_id = %session_id, "No save found, starting fresh");
                SaveFile::empty(session_id.clone(), self.clock.now())
            }
        };
        slot.save = Some(save.clone());
        Ok(save)
    }

    /// A consistent copy of the session aggregate.
    ///
    /// The lock is held only while copying, so slow collaborator calls made
    /// with this snapshot never block other operations.
    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SaveFile, EngineError> {
        let handle = self.handle(session_id);
        let mut slot = handle.lock().await;
        self.ensure_loaded(&mut slot, session_id).await
    }

    /// Apply `mutation` to a copy of the aggregate and persist it incrementally.
    pub async fn mutate<T>(
        &self,
        session_id: &SessionId,
        mutation: impl FnOnce(&mut SaveFile, DateTime<Utc>) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let handle = self.handle(session_id);
        let mut slot = handle.lock_owned().await;
        let mut working = self.ensure_loaded(&mut slot, session_id).await?;

        let now = self.clock.now();
        let out = mutation(&mut working, now)?;
        working.touch(now);
        working.check_invariants().map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "Refusing to persist invalid aggregate");
            EngineError::internal(format!("invariant violated: {e}"))
        })?;

        // The blocking task owns the guard: once started, the commit and the
        // cache update complete even if the caller goes away.
        let repo = Arc::clone(&self.repo);
        let report = tokio::task::spawn_blocking(move || {
            let report = repo.commit(&working, false)?;
            slot.save = Some(working);
            Ok::<_, EngineError>(report)
        })
        .await??;
        tracing::trace!(
            session_id = %session_id,
            written = report.written.len(),
            reused = report.reused.len(),
            "Committed session"
        );

        Ok(out)
    }

    /// Replace the session with a fresh default and rewrite every shard.
    ///
    /// The stored save is never read, so a corrupted bundle or a pointer
    /// holding another session can always be cleared.
    pub async fn reset(
        &self,
        session_id: &SessionId,
    ) -> Result<(SaveFile, CommitReport), EngineError> {
        let handle = self.handle(session_id);
        let mut slot = handle.lock_owned().await;
        let fresh = SaveFile::empty(session_id.clone(), self.clock.now());

        let repo = Arc::clone(&self.repo);
        let (save, report) = tokio::task::spawn_blocking(move || {
            let report = repo.commit(&fresh, true)?;
            slot.save = Some(fresh.clone());
            Ok::<_, EngineError>((fresh, report))
        })
        .await??;
        Ok((save, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockSaveRepo, StoreError};
    use crate::infrastructure::save_store::SaveStore;
    use wrldkeep_domain::LogPayload;

    fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc::now()))
    }

    #[tokio::test]
    async fn fresh_session_starts_empty_and_is_not_persisted_by_reads() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().times(1).returning(|_| Ok(None));
        repo.expect_commit().times(0);
        let store = SessionStore::new(Arc::new(repo), clock());

        let id = SessionId::default();
        let first = store.snapshot(&id).await.expect("snapshot");
        let second = store.snapshot(&id).await.expect("cached snapshot");
        assert_eq!(first, second);
        assert!(first.game_logs.is_empty());
    }

    #[tokio::test]
    async fn stored_session_id_must_match_key() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().returning(|_| {
            let other = SessionId::new("sess_other").expect("valid id");
            Ok(Some(SaveFile::empty(other, Utc::now())))
        });
        let store = SessionStore::new(Arc::new(repo), clock());

        let err = store
            .snapshot(&SessionId::default())
            .await
            .expect_err("mismatch");
        assert_eq!(err.code(), "SESSION_MISMATCH");
    }

    #[tokio::test]
    async fn failed_commit_keeps_previous_aggregate() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().returning(|_| Ok(None));
        repo.expect_commit().returning(|_, _| {
            Err(StoreError::io(
                "write",
                std::path::Path::new("/read-only"),
                "permission denied",
            ))
        });
        let store = SessionStore::new(Arc::new(repo), clock());
        let id = SessionId::default();

        let err = store
            .mutate(&id, |save, now| {
                save.append_log("note", "lost", LogPayload::new(), now);
                Ok(())
            })
            .await
            .expect_err("commit fails");
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(store.snapshot(&id).await.expect("snapshot").game_logs.is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_commits_nothing() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().returning(|_| Ok(None));
        repo.expect_commit().times(0);
        let store = SessionStore::new(Arc::new(repo), clock());

        let result: Result<(), _> = store
            .mutate(&SessionId::default(), |save, now| {
                save.append_log("note", "half done", LogPayload::new(), now);
                Err(EngineError::ClockNotInitialized)
            })
            .await;
        assert_eq!(result, Err(EngineError::ClockNotInitialized));
    }

    #[tokio::test]
    async fn commits_stamp_the_clock_time() {
        use crate::infrastructure::ports::MockClockPort;
        use chrono::TimeZone;

        let stamp = Utc
            .with_ymd_and_hms(2026, 5, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(move || stamp);
        let mut repo = MockSaveRepo::new();
        repo.expect_load().returning(|_| Ok(None));
        repo.expect_commit()
            .withf(move |save, force| save.updated_at == stamp && !force)
            .times(1)
            .returning(|_, _| Ok(CommitReport::default()));
        let store = SessionStore::new(Arc::new(repo), Arc::new(clock));

        store
            .mutate(&SessionId::default(), |save, now| {
                save.append_log("note", "stamped", LogPayload::new(), now);
                Ok(())
            })
            .await
            .expect("mutate");
        let save = store.snapshot(&SessionId::default()).await.expect("snapshot");
        assert_eq!(save.player_runtime_data.updated_at, stamp);
        assert_eq!(save.game_logs[0].created_at, stamp);
    }

    #[tokio::test]
    async fn reset_never_reads_the_stored_save() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().times(0);
        repo.expect_commit()
            .withf(|save, force| *force && save.game_logs.is_empty() && save.area_snapshot.clock.is_none())
            .times(1)
            .returning(|_, _| Ok(CommitReport::default()));
        let store = SessionStore::new(Arc::new(repo), clock());
        let id = SessionId::default();

        let (save, _) = store.reset(&id).await.expect("reset");
        assert_eq!(save.session_id, id);
        assert_eq!(store.snapshot(&id).await.expect("cached"), save);
    }

    #[tokio::test]
    async fn failed_reset_keeps_cache_untouched() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().times(1).returning(|_| Ok(None));
        repo.expect_commit().returning(|_, _| {
            Err(StoreError::io(
                "write",
                std::path::Path::new("/read-only"),
                "permission denied",
            ))
        });
        let store = SessionStore::new(Arc::new(repo), clock());
        let id = SessionId::default();

        let err = store.reset(&id).await.expect_err("commit fails");
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(store.snapshot(&id).await.expect("snapshot").game_logs.is_empty());
    }

    #[tokio::test]
    async fn idle_slots_are_evicted_past_the_cap() {
        let mut repo = MockSaveRepo::new();
        repo.expect_load().times(4).returning(|_| Ok(None));
        let store = SessionStore::new(Arc::new(repo), clock()).with_max_cached(2);
        let session = |name: &str| SessionId::new(name).expect("valid id");

        store.snapshot(&session("sess_a")).await.expect("a");
        store.snapshot(&session("sess_b")).await.expect("b");
        assert_eq!(store.cached_sessions(), 2);

        store.snapshot(&session("sess_c")).await.expect("c");
        assert_eq!(store.cached_sessions(), 1);

        // Evicted sessions reload from the repo.
        store.snapshot(&session("sess_a")).await.expect("a again");
        assert_eq!(store.cached_sessions(), 2);
    }

    #[tokio::test]
    async fn concurrent_mutations_on_one_session_serialize() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo: Arc<dyn SaveRepo> = Arc::new(SaveStore::new(dir.path()));
        let store = Arc::new(SessionStore::new(Arc::clone(&repo), clock()));
        let id = SessionId::default();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let id = id.clone();
                tokio::spawn(async move {
                    store
                        .mutate(&id, move |save, now| {
                            save.append_log("note", format!("entry {i}"), LogPayload::new(), now);
                            Ok(())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("mutation");
        }

        let persisted = repo.load(&id).expect("load").expect("present");
        assert_eq!(persisted.game_logs.len(), 8);
        assert_eq!(store.snapshot(&id).await.expect("snapshot"), persisted);
    }
}
