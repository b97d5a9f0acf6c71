//! Generate the zone set around the player.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wrldkeep_domain::{
    log_kinds, AreaSnapshot, LogPayload, MapZone, Position, SaveFile, SessionId,
};

use super::candidate::{validate_zone, ZoneCandidate};
use super::ensure_area;
use super::fallback::fallback_zone;
use super::overlap::resolve_overlaps;
use crate::infrastructure::ports::{GenerationPort, ZoneProposalRequest};
use crate::stores::SessionStore;
use crate::use_cases::EngineError;

/// Hard cap on zones per generation.
pub const MAX_ZONES_PER_GENERATION: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRegionsInput {
    pub session_id: SessionId,
    pub desired_count: usize,
    pub max_count: usize,
    pub world_prompt: String,
    pub force_regenerate: bool,
    /// Overrides the stored runtime position as the generation center
    pub player_position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRegionsResult {
    pub session_id: SessionId,
    /// False when the stored zone set was returned unchanged
    pub generated: bool,
    pub player_position: Option<Position>,
    pub zones: Vec<MapZone>,
}

impl GenerateRegionsResult {
    fn from_save(save: &SaveFile, generated: bool) -> Self {
        Self {
            session_id: save.session_id.clone(),
            generated,
            player_position: save.map_snapshot.player_position.clone(),
            zones: save.map_snapshot.zones.clone(),
        }
    }
}

/// Turn collaborator proposals into a validated, non-overlapping zone set.
pub struct GenerateRegions {
    sessions: Arc<SessionStore>,
    generator: Arc<dyn GenerationPort>,
}

impl GenerateRegions {
    pub fn new(sessions: Arc<SessionStore>, generator: Arc<dyn GenerationPort>) -> Self {
        Self {
            sessions,
            generator,
        }
    }

    /// Generate zones, or return the stored set when one exists and
    /// regeneration is not forced.
    ///
    /// Collaborator failures never surface: unusable output is replaced with
    /// fallback zones so the result is never empty.
    pub async fn execute(
        &self,
        input: GenerateRegionsInput,
    ) -> Result<GenerateRegionsResult, EngineError> {
        let snapshot = self.sessions.snapshot(&input.session_id).await?;
        if !input.force_regenerate && snapshot.map_snapshot.is_generated() {
            if snapshot.area_snapshot.zones.is_empty() {
                return self.rebuild_area(&input.session_id).await;
            }
            return Ok(GenerateRegionsResult::from_save(&snapshot, false));
        }

        let center = input
            .player_position
            .clone()
            .or_else(|| snapshot.player_runtime_data.current_position.clone())
            .unwrap_or_else(Position::origin);
        let count = zone_count(input.desired_count, input.max_count);
        let recent_events = snapshot
            .recent_logs(snapshot.game_log_settings.ai_fetch_limit as usize)
            .iter()
            .map(|entry| entry.message.clone())
            .collect();

        let request = ZoneProposalRequest {
            center: center.clone(),
            count,
            world_prompt: input.world_prompt.clone(),
            recent_events,
        };
        let proposals = match self.generator.propose_zones(request).await {
            Ok(proposals) => proposals,
            Err(e) => {
                tracing::warn!(
                    session_id = %input.session_id,
                    error = %e,
                    "Zone generation failed, using fallback zones"
                );
                Vec::new()
            }
        };
        let zones = build_zones(&proposals, &center, count);

        let force = input.force_regenerate;
        self.sessions
            .mutate(&input.session_id, move |save, now| {
                // Another request may have generated while the collaborator ran
                if !force && save.map_snapshot.is_generated() {
                    return Ok(GenerateRegionsResult::from_save(save, false));
                }

                let clock = save.area_snapshot.clock.take();
                let area =
                    AreaSnapshot::from_map(&zones, Some((center.x as f64, center.y as f64)), clock);
                let mut player = center;
                if let Some(zone_id) = &area.current_zone_id {
                    player.zone_id = zone_id.clone();
                }

                let mut payload = LogPayload::new();
                payload.insert("count".into(), Value::from(zones.len()));
                payload.insert(
                    "zone_ids".into(),
                    zones.iter().map(|z| Value::from(z.zone_id.as_str())).collect(),
                );
                save.append_log(
                    log_kinds::AREA_GENERATE,
                    format!(
                        "Generated {} zones around ({}, {})",
                        zones.len(),
                        player.x,
                        player.y
                    ),
                    payload,
                    now,
                );

                tracing::info!(
                    session_id = %save.session_id,
                    zone_count = zones.len(),
                    "Generated world map"
                );
                save.map_snapshot.player_position = Some(player.clone());
                save.map_snapshot.zones = zones;
                save.area_snapshot = area;
                save.player_runtime_data.current_position = Some(player);
                Ok(GenerateRegionsResult::from_save(save, true))
            })
            .await
    }

    /// Stored map without an area view: materialize it once.
    async fn rebuild_area(
        &self,
        session_id: &SessionId,
    ) -> Result<GenerateRegionsResult, EngineError> {
        self.sessions
            .mutate(session_id, |save, _now| {
                ensure_area(save);
                Ok(GenerateRegionsResult::from_save(save, false))
            })
            .await
    }
}

/// `clamp(min(desired, max), 1, 10)`
pub fn zone_count(desired: usize, max: usize) -> usize {
    desired.min(max).clamp(1, MAX_ZONES_PER_GENERATION)
}

/// Validate proposals in order, pad with fallback zones up to `count`, then
/// resolve overlaps.
pub fn build_zones(proposals: &[Value], center: &Position, count: usize) -> Vec<MapZone> {
    let mut zones: Vec<MapZone> = Vec::with_capacity(count);
    let mut coords = HashSet::new();
    for raw in proposals {
        if zones.len() >= count {
            break;
        }
        match validate_zone(raw, center, &coords) {
            ZoneCandidate::Valid(zone) => {
                coords.insert((zone.x, zone.y));
                zones.push(zone);
            }
            ZoneCandidate::Rejected(reason) => {
                tracing::debug!(reason = %reason, "Rejected zone proposal");
            }
        }
    }

    let accepted = zones.len();
    let mut index = 0;
    while zones.len() < count {
        let zone = fallback_zone(center, index);
        index += 1;
        if coords.insert((zone.x, zone.y)) {
            zones.push(zone);
        }
    }
    if zones.len() > accepted {
        tracing::debug!(
            accepted,
            fallback = zones.len() - accepted,
            "Padded zone set with fallback zones"
        );
    }

    resolve_overlaps(&mut zones);
    zones
}
