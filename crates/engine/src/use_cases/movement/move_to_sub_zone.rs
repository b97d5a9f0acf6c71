//! Move the player between sub-zones of the area.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use wrldkeep_domain::{
    log_kinds, Coord3D, LogPayload, Position, SaveFile, SessionId, SubZoneId, WorldClock, ZoneId,
};

use super::calculator::{round_distance, sub_zone_travel};
use super::stamp_time_segment;
use crate::stores::SessionStore;
use crate::use_cases::region::ensure_area;
use crate::use_cases::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct MoveToSubZoneInput {
    pub session_id: SessionId,
    pub to_sub_zone_id: SubZoneId,
}

/// One end of a sub-zone move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPoint {
    pub zone_id: Option<ZoneId>,
    pub sub_zone_id: Option<SubZoneId>,
    pub coord: Option<Coord3D>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveToSubZoneResult {
    pub from_point: AreaPoint,
    pub to_point: AreaPoint,
    pub distance_m: f64,
    pub duration_min: u32,
    pub clock_delta_min: u32,
    pub clock_after: WorldClock,
    pub movement_feedback: String,
}

pub struct MoveToSubZone {
    sessions: Arc<SessionStore>,
}

impl MoveToSubZone {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Walk to a sub-zone, advancing the clock by the travel time.
    ///
    /// Moving to the sub-zone the player already stands in changes nothing.
    pub async fn execute(
        &self,
        input: MoveToSubZoneInput,
    ) -> Result<MoveToSubZoneResult, EngineError> {
        let snapshot = self.sessions.snapshot(&input.session_id).await?;
        if let Some(result) = already_there(&snapshot, &input.to_sub_zone_id)? {
            return Ok(result);
        }

        self.sessions
            .mutate(&input.session_id, move |save, now| {
                ensure_area(save);
                let to_sub = save
                    .area_snapshot
                    .sub_zone(&input.to_sub_zone_id)
                    .cloned()
                    .ok_or_else(|| EngineError::SubZoneNotFound(input.to_sub_zone_id.to_string()))?;
                if !save.area_snapshot.is_clock_initialized() {
                    return Err(EngineError::ClockNotInitialized);
                }
                if let Some(result) = already_there(save, &to_sub.sub_zone_id)? {
                    return Ok(result);
                }

                let area = &save.area_snapshot;
                let from_point = match area
                    .current_sub_zone_id
                    .as_ref()
                    .and_then(|id| area.sub_zone(id))
                {
                    Some(current) => AreaPoint {
                        zone_id: Some(current.zone_id.clone()),
                        sub_zone_id: Some(current.sub_zone_id.clone()),
                        coord: Some(current.coord),
                    },
                    None => {
                        let zone_id = area
                            .current_zone_id
                            .clone()
                            .unwrap_or_else(|| to_sub.zone_id.clone());
                        AreaPoint {
                            coord: area.zone(&zone_id).map(|z| z.center),
                            zone_id: Some(zone_id),
                            sub_zone_id: None,
                        }
                    }
                };

                let travel = sub_zone_travel(
                    from_point.coord.as_ref(),
                    &to_sub.coord,
                    save.player_static_data.move_speed_mph,
                );
                let distance_m = round_distance(travel.distance_m);

                let advanced = save.area_snapshot.advance_clock(travel.duration_min, now)?;
                save.area_snapshot.enter_sub_zone(&to_sub.sub_zone_id)?;
                stamp_time_segment(
                    &mut save.area_snapshot,
                    &to_sub.zone_id,
                    Some(&to_sub.sub_zone_id),
                );

                let position = Position::new(
                    to_sub.coord.x.round() as i64,
                    to_sub.coord.y.round() as i64,
                    to_sub.coord.z.round() as i64,
                    to_sub.zone_id.clone(),
                );
                save.map_snapshot.player_position = Some(position.clone());
                save.player_runtime_data.current_position = Some(position);

                let feedback = format!(
                    "You move to {}, taking {} minutes.",
                    to_sub.name, travel.duration_min
                );
                let mut payload = LogPayload::new();
                payload.insert(
                    "from_sub_zone_id".into(),
                    from_point
                        .sub_zone_id
                        .as_ref()
                        .map_or(Value::Null, |id| Value::from(id.as_str())),
                );
                payload.insert(
                    "to_sub_zone_id".into(),
                    Value::from(to_sub.sub_zone_id.as_str()),
                );
                payload.insert("distance_m".into(), Value::from(distance_m));
                payload.insert("duration_min".into(), Value::from(travel.duration_min));
                save.append_log(log_kinds::AREA_MOVE, feedback.clone(), payload, now);

                tracing::info!(
                    session_id = %save.session_id,
                    sub_zone_id = %to_sub.sub_zone_id,
                    duration_min = travel.duration_min,
                    "Moved to sub-zone"
                );
                Ok(MoveToSubZoneResult {
                    from_point,
                    to_point: AreaPoint {
                        zone_id: Some(to_sub.zone_id.clone()),
                        sub_zone_id: Some(to_sub.sub_zone_id.clone()),
                        coord: Some(to_sub.coord),
                    },
                    distance_m,
                    duration_min: travel.duration_min,
                    clock_delta_min: advanced.minutes_advanced,
                    clock_after: advanced.new_time,
                    movement_feedback: feedback,
                })
            })
            .await
    }
}

/// The no-op result when the player already stands in `target`.
///
/// Requires a running clock like any other move.
fn already_there(
    save: &SaveFile,
    target: &SubZoneId,
) -> Result<Option<MoveToSubZoneResult>, EngineError> {
    let area = &save.area_snapshot;
    if area.current_sub_zone_id.as_ref() != Some(target) {
        return Ok(None);
    }
    let Some(sub) = area.sub_zone(target) else {
        return Ok(None);
    };
    let clock = area.clock.clone().ok_or(EngineError::ClockNotInitialized)?;
    let point = AreaPoint {
        zone_id: Some(sub.zone_id.clone()),
        sub_zone_id: Some(sub.sub_zone_id.clone()),
        coord: Some(sub.coord),
    };
    Ok(Some(MoveToSubZoneResult {
        from_point: point.clone(),
        to_point: point,
        distance_m: 0.0,
        duration_min: 0,
        clock_delta_min: 0,
        clock_after: clock,
        movement_feedback: format!("You are already at {}.", sub.name),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{two_villages, TestStore};

    fn input(to: &str) -> MoveToSubZoneInput {
        MoveToSubZoneInput {
            session_id: SessionId::default(),
            to_sub_zone_id: SubZoneId::from(to),
        }
    }

    #[tokio::test]
    async fn first_move_starts_from_zone_center() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToSubZone::new(Arc::clone(&store.sessions));

        let result = use_case.execute(input("sub_zone_0_0_0_2")).await.expect("move");
        assert_eq!(result.from_point.sub_zone_id, None);
        assert_eq!(result.from_point.coord, Some(Coord3D::new(0.0, 0.0, 0.0)));
        assert_eq!(result.distance_m, 50.0);
        assert_eq!(result.duration_min, 1);
        assert_eq!(result.clock_delta_min, 1);
        assert_eq!(result.clock_after.display(), "1024-03-14 09:31");
        assert_eq!(result.movement_feedback, "You move to Well, taking 1 minutes.");

        let save = store.sessions.snapshot(&SessionId::default()).await.expect("snapshot");
        assert_eq!(
            save.area_snapshot.current_sub_zone_id,
            Some(SubZoneId::from("sub_zone_0_0_0_2"))
        );
        let position = save.player_runtime_data.current_position.expect("position");
        assert_eq!((position.x, position.y), (30, 40));
        assert_eq!(save.game_logs.last().map(|e| e.kind.as_str()), Some(log_kinds::AREA_MOVE));
    }

    #[tokio::test]
    async fn moving_to_current_sub_zone_is_a_no_op() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        let use_case = MoveToSubZone::new(Arc::clone(&store.sessions));
        use_case.execute(input("sub_zone_0_0_0_2")).await.expect("move");
        let before = store.sessions.snapshot(&id).await.expect("snapshot");

        let result = use_case.execute(input("sub_zone_0_0_0_2")).await.expect("stay");
        assert_eq!(result.duration_min, 0);
        assert_eq!(result.distance_m, 0.0);
        assert_eq!(result.movement_feedback, "You are already at Well.");
        assert_eq!(store.sessions.snapshot(&id).await.expect("snapshot"), before);
    }

    #[tokio::test]
    async fn moving_across_zones_selects_the_owning_zone() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToSubZone::new(Arc::clone(&store.sessions));
        use_case.execute(input("sub_zone_0_0_0_1")).await.expect("altar");

        let result = use_case.execute(input("sub_zone_600_0_0_2")).await.expect("mill");
        assert_eq!(result.distance_m, 550.0);
        assert_eq!(result.duration_min, 8);

        let save = store.sessions.snapshot(&SessionId::default()).await.expect("snapshot");
        assert_eq!(
            save.area_snapshot.current_zone_id,
            Some(ZoneId::from("zone_600_0_0"))
        );
        assert!(save.area_snapshot.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn unknown_sub_zone_is_not_found() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToSubZone::new(Arc::clone(&store.sessions));

        let err = use_case.execute(input("sub_nowhere_1")).await.expect_err("missing");
        assert_eq!(err.code(), "SUB_ZONE_NOT_FOUND");
    }

    #[tokio::test]
    async fn uninitialized_clock_blocks_the_move() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), false).await;
        let before = store.sessions.snapshot(&id).await.expect("snapshot");
        let use_case = MoveToSubZone::new(Arc::clone(&store.sessions));

        let err = use_case.execute(input("sub_zone_0_0_0_1")).await.expect_err("no clock");
        assert_eq!(err, EngineError::ClockNotInitialized);
        assert_eq!(store.sessions.snapshot(&id).await.expect("snapshot"), before);
    }
}
