//! Discover new interactions in a sub-zone from player intent.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wrldkeep_domain::common::truncate_chars;
use wrldkeep_domain::{
    log_kinds, normalize_name, AreaSubZone, GenerationMode, Interaction, InteractionStatus,
    InteractionType, LogPayload, SaveFile, SessionId, SubZoneId, WorldClock,
};

use super::candidate::{validate_interaction, InteractionCandidate};
use crate::infrastructure::ports::{GenerationPort, InteractionProposalRequest};
use crate::stores::SessionStore;
use crate::use_cases::movement::stamp_time_segment;
use crate::use_cases::region::ensure_area;
use crate::use_cases::EngineError;

/// Raw proposals looked at per call.
pub const MAX_RAW_CANDIDATES: usize = 5;
/// Interactions merged per call.
pub const MAX_NEW_INTERACTIONS: usize = 3;
/// Intent characters kept in the fallback name.
const FALLBACK_INTENT_CHARS: usize = 12;
const DISCOVERY_MINUTES: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverInteractionsInput {
    pub session_id: SessionId,
    pub sub_zone_id: SubZoneId,
    pub intent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverInteractionsResult {
    pub sub_zone_id: SubZoneId,
    pub generated_mode: GenerationMode,
    pub new_interactions: Vec<Interaction>,
    pub clock_after: WorldClock,
}

pub struct DiscoverInteractions {
    sessions: Arc<SessionStore>,
    generator: Arc<dyn GenerationPort>,
}

impl DiscoverInteractions {
    pub fn new(sessions: Arc<SessionStore>, generator: Arc<dyn GenerationPort>) -> Self {
        Self {
            sessions,
            generator,
        }
    }

    /// Ask the collaborator for interactions matching `intent` and merge the
    /// usable ones. Always costs one minute.
    pub async fn execute(
        &self,
        input: DiscoverInteractionsInput,
    ) -> Result<DiscoverInteractionsResult, EngineError> {
        // Prompt context from a snapshot; the collaborator runs unlocked.
        let mut view = self.sessions.snapshot(&input.session_id).await?;
        let target = target_sub_zone(&mut view, &input.sub_zone_id)?.clone();

        let request = InteractionProposalRequest {
            sub_zone_name: target.name.clone(),
            sub_zone_description: target.description.clone(),
            intent: input.intent.clone(),
            existing_names: target
                .key_interactions
                .iter()
                .map(|i| i.name.clone())
                .collect(),
        };
        let proposals = match self.generator.propose_interactions(request).await {
            Ok(proposals) => proposals,
            Err(e) => {
                tracing::warn!(
                    session_id = %input.session_id,
                    sub_zone_id = %input.sub_zone_id,
                    error = %e,
                    "Interaction generation failed, using fallback"
                );
                Vec::new()
            }
        };
        let candidates: Vec<InteractionCandidate> = proposals
            .iter()
            .take(MAX_RAW_CANDIDATES)
            .map(validate_interaction)
            .collect();

        self.sessions
            .mutate(&input.session_id, move |save, now| {
                let target = target_sub_zone(save, &input.sub_zone_id)?;
                let accepted = merge_candidates(target, &candidates, &input.intent);
                let sub_name = target.name.clone();
                let zone_id = target.zone_id.clone();

                let advanced = save.area_snapshot.advance_clock(DISCOVERY_MINUTES, now)?;
                if let Some(zone) = save.area_snapshot.zones.iter_mut().find(|z| z.zone_id == zone_id) {
                    zone.state.last_refresh_clock = advanced.new_time.display();
                }
                stamp_time_segment(&mut save.area_snapshot, &zone_id, Some(&input.sub_zone_id));

                let mut payload = LogPayload::new();
                payload.insert("sub_zone_id".into(), Value::from(input.sub_zone_id.as_str()));
                payload.insert("count".into(), Value::from(accepted.len()));
                save.append_log(
                    log_kinds::AREA_REFRESH,
                    format!("Discovered new interactions at [{sub_name}]"),
                    payload,
                    now,
                );

                tracing::info!(
                    session_id = %save.session_id,
                    sub_zone_id = %input.sub_zone_id,
                    count = accepted.len(),
                    "Discovered interactions"
                );
                Ok(DiscoverInteractionsResult {
                    sub_zone_id: input.sub_zone_id,
                    generated_mode: GenerationMode::Instant,
                    new_interactions: accepted,
                    clock_after: advanced.new_time,
                })
            })
            .await
    }
}

/// Look up the target sub-zone, materializing the area first if needed.
///
/// Fails before any collaborator call when the clock is not running.
fn target_sub_zone<'a>(
    save: &'a mut SaveFile,
    sub_zone_id: &SubZoneId,
) -> Result<&'a mut AreaSubZone, EngineError> {
    ensure_area(save);
    if !save.area_snapshot.is_clock_initialized() {
        if save.area_snapshot.sub_zone(sub_zone_id).is_none() {
            return Err(EngineError::SubZoneNotFound(sub_zone_id.to_string()));
        }
        return Err(EngineError::ClockNotInitialized);
    }
    save.area_snapshot
        .sub_zone_mut(sub_zone_id)
        .ok_or_else(|| EngineError::SubZoneNotFound(sub_zone_id.to_string()))
}

/// Merge valid candidates into `target`, deduplicating by name.
///
/// When no candidate is valid at all, one "Investigate" placeholder is added
/// instead. Valid candidates that all duplicate existing names add nothing.
fn merge_candidates(
    target: &mut AreaSubZone,
    candidates: &[InteractionCandidate],
    intent: &str,
) -> Vec<Interaction> {
    let mut seen: HashSet<String> = target
        .key_interactions
        .iter()
        .map(Interaction::name_key)
        .collect();
    let mut accepted = Vec::new();
    let mut any_valid = false;

    for candidate in candidates {
        let InteractionCandidate::Valid { name, kind, status } = candidate else {
            if let InteractionCandidate::Rejected(reason) = candidate {
                tracing::debug!(reason = %reason, "Rejected interaction proposal");
            }
            continue;
        };
        any_valid = true;
        if accepted.len() >= MAX_NEW_INTERACTIONS || !seen.insert(normalize_name(name)) {
            continue;
        }
        let interaction = Interaction::new(target.next_interaction_id(), name.clone())
            .with_kind(*kind)
            .with_status(*status)
            .with_generated_mode(GenerationMode::Instant);
        target.key_interactions.push(interaction.clone());
        accepted.push(interaction);
    }

    if !any_valid {
        let name = fallback_name(intent);
        if !target.has_interaction_named(&name) {
            let interaction = Interaction::new(target.next_interaction_id(), name)
                .with_kind(InteractionType::Scene)
                .with_status(InteractionStatus::Ready)
                .with_generated_mode(GenerationMode::Instant);
            target.key_interactions.push(interaction.clone());
            accepted.push(interaction);
        }
    }
    accepted
}

fn fallback_name(intent: &str) -> String {
    let intent = intent.trim();
    let subject = if intent.is_empty() {
        "surroundings"
    } else {
        truncate_chars(intent, FALLBACK_INTENT_CHARS).trim_end()
    };
    format!("Investigate: {subject}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{GenerationError, MockGenerationPort};
    use crate::test_fixtures::{two_villages, TestStore};
    use serde_json::json;

    const ALTAR: &str = "sub_zone_0_0_0_1";

    fn input(intent: &str) -> DiscoverInteractionsInput {
        DiscoverInteractionsInput {
            session_id: SessionId::default(),
            sub_zone_id: SubZoneId::from(ALTAR),
            intent: intent.to_string(),
        }
    }

    fn generator(proposals: Vec<Value>) -> Arc<dyn GenerationPort> {
        let mut generator = MockGenerationPort::new();
        generator
            .expect_propose_interactions()
            .returning(move |_| Ok(proposals.clone()));
        Arc::new(generator)
    }

    async fn interactions(store: &TestStore) -> Vec<Interaction> {
        let save = store.sessions.snapshot(&SessionId::default()).await.expect("snapshot");
        save.area_snapshot
            .sub_zone(&SubZoneId::from(ALTAR))
            .expect("altar")
            .key_interactions
            .clone()
    }

    #[tokio::test]
    async fn merges_valid_candidates_with_fresh_ids() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = DiscoverInteractions::new(
            Arc::clone(&store.sessions),
            generator(vec![
                json!({"name": "Read runes", "type": "item", "status": "ready"}),
                json!({"name": "Pray", "type": "scene", "status": "ready"}),
                json!({"name": "read RUNES", "type": "item", "status": "ready"}),
            ]),
        );

        let result = use_case.execute(input("study the altar")).await.expect("discover");
        let names: Vec<_> = result.new_interactions.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Read runes", "Pray"]);
        assert!(result
            .new_interactions
            .iter()
            .all(|i| i.generated_mode == GenerationMode::Instant));
        assert_eq!(result.clock_after.display(), "1024-03-14 09:31");

        let all = interactions(&store).await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].interaction_id.as_str(), "int_sub_zone_0_0_0_1_2");
        assert_eq!(all[2].interaction_id.as_str(), "int_sub_zone_0_0_0_1_3");
    }

    #[tokio::test]
    async fn at_most_three_are_merged() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let proposals = (0..6)
            .map(|i| json!({"name": format!("Action {i}"), "type": "scene", "status": "ready"}))
            .collect();
        let use_case = DiscoverInteractions::new(Arc::clone(&store.sessions), generator(proposals));

        let result = use_case.execute(input("look around")).await.expect("discover");
        assert_eq!(result.new_interactions.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_name_leaves_count_unchanged() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        store
            .sessions
            .mutate(&id, |save, _now| {
                let sub = save
                    .area_snapshot
                    .sub_zone_mut(&SubZoneId::from(ALTAR))
                    .expect("altar");
                let next = sub.next_interaction_id();
                sub.key_interactions.push(Interaction::new(next, "observe altar"));
                Ok(())
            })
            .await
            .expect("seed interaction");
        let before = interactions(&store).await.len();

        let use_case = DiscoverInteractions::new(
            Arc::clone(&store.sessions),
            generator(vec![json!({"name": "Observe Altar", "type": "scene", "status": "ready"})]),
        );
        let result = use_case.execute(input("observe")).await.expect("discover");
        assert!(result.new_interactions.is_empty());
        assert_eq!(interactions(&store).await.len(), before);
    }

    #[tokio::test]
    async fn all_duplicate_candidates_skip_the_fallback() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        store
            .sessions
            .mutate(&id, |save, _now| {
                let sub = save
                    .area_snapshot
                    .sub_zone_mut(&SubZoneId::from(ALTAR))
                    .expect("altar");
                for name in ["observe altar", "ring bell"] {
                    let next = sub.next_interaction_id();
                    sub.key_interactions.push(Interaction::new(next, name));
                }
                Ok(())
            })
            .await
            .expect("seed interactions");
        let before = interactions(&store).await;

        let use_case = DiscoverInteractions::new(
            Arc::clone(&store.sessions),
            generator(vec![
                json!({"name": "Observe Altar", "type": "scene", "status": "ready"}),
                json!({"name": "RING BELL", "type": "scene", "status": "ready"}),
                json!({"name": "No type"}),
            ]),
        );
        let result = use_case.execute(input("pray")).await.expect("discover");
        assert!(result.new_interactions.is_empty());

        let after = interactions(&store).await;
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|i| !i.name.starts_with("Investigate:")));
    }

    #[tokio::test]
    async fn invalid_output_yields_one_investigate_placeholder() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = DiscoverInteractions::new(
            Arc::clone(&store.sessions),
            generator(vec![json!({"name": "No type"}), json!(7)]),
        );

        let result = use_case.execute(input("search well")).await.expect("discover");
        assert_eq!(result.new_interactions.len(), 1);
        let fallback = &result.new_interactions[0];
        assert_eq!(fallback.name, "Investigate: search well");
        assert_eq!(fallback.kind, InteractionType::Scene);
        assert_eq!(fallback.status, InteractionStatus::Ready);
        assert!(fallback.placeholder);
    }

    #[tokio::test]
    async fn collaborator_failure_yields_placeholder() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let mut failing = MockGenerationPort::new();
        failing
            .expect_propose_interactions()
            .returning(|_| Err(GenerationError::RequestFailed("timeout".to_string())));
        let use_case = DiscoverInteractions::new(Arc::clone(&store.sessions), Arc::new(failing));

        let result = use_case
            .execute(input("examine the carvings closely"))
            .await
            .expect("discover");
        assert_eq!(result.new_interactions[0].name, "Investigate: examine the");
        let save = store.sessions.snapshot(&SessionId::default()).await.expect("snapshot");
        assert_eq!(save.game_logs.last().map(|e| e.kind.as_str()), Some(log_kinds::AREA_REFRESH));
    }

    #[tokio::test]
    async fn requires_running_clock_and_known_sub_zone() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), false).await;
        let mut untouched = MockGenerationPort::new();
        untouched.expect_propose_interactions().times(0);
        let use_case = DiscoverInteractions::new(Arc::clone(&store.sessions), Arc::new(untouched));

        let err = use_case.execute(input("look")).await.expect_err("no clock");
        assert_eq!(err, EngineError::ClockNotInitialized);

        let mut missing = input("look");
        missing.sub_zone_id = SubZoneId::from("sub_nowhere_1");
        let err = use_case.execute(missing).await.expect_err("missing");
        assert_eq!(err.code(), "SUB_ZONE_NOT_FOUND");
    }
}
