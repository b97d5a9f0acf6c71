//! Move the player between zones on the world map.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use wrldkeep_domain::{
    log_kinds, Coord3D, LogPayload, Position, SessionId, WorldClock, ZoneId,
};

use super::calculator::{round_distance, zone_travel};
use super::stamp_time_segment;
use crate::stores::SessionStore;
use crate::use_cases::region::ensure_area;
use crate::use_cases::EngineError;

const CURRENT_POSITION: &str = "Current position";

#[derive(Debug, Clone, PartialEq)]
pub struct MoveToZoneInput {
    pub session_id: SessionId,
    /// Unknown or missing origins fall back to the runtime position
    pub from_zone_id: Option<ZoneId>,
    pub to_zone_id: ZoneId,
}

/// Log-ready description of one zone move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementLog {
    pub id: String,
    pub summary: String,
    pub payload: LogPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveToZoneResult {
    pub new_position: Position,
    pub distance_m: f64,
    pub duration_min: u32,
    pub clock_after: WorldClock,
    pub movement_log: MovementLog,
}

pub struct MoveToZone {
    sessions: Arc<SessionStore>,
}

impl MoveToZone {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }

    /// Travel to `to_zone_id`, advancing the clock by the travel time.
    ///
    /// # Errors
    ///
    /// `ZoneNotFound` for an unknown destination, `ClockNotInitialized`
    /// before the clock is set. Neither mutates the session.
    pub async fn execute(&self, input: MoveToZoneInput) -> Result<MoveToZoneResult, EngineError> {
        self.sessions
            .mutate(&input.session_id, move |save, now| {
                let to_zone = save
                    .map_snapshot
                    .zone(&input.to_zone_id)
                    .cloned()
                    .ok_or_else(|| EngineError::ZoneNotFound(input.to_zone_id.to_string()))?;
                if !save.area_snapshot.is_clock_initialized() {
                    return Err(EngineError::ClockNotInitialized);
                }

                let (from_id, from_name, from_coord) = match input
                    .from_zone_id
                    .as_ref()
                    .and_then(|id| save.map_snapshot.zone(id))
                {
                    Some(zone) => (
                        Some(zone.zone_id.clone()),
                        zone.name.clone(),
                        zone.center(),
                    ),
                    None => {
                        let pos = save
                            .player_runtime_data
                            .current_position
                            .clone()
                            .unwrap_or_else(Position::origin);
                        (
                            None,
                            CURRENT_POSITION.to_string(),
                            Coord3D::new(pos.x as f64, pos.y as f64, pos.z as f64),
                        )
                    }
                };

                let to_coord = to_zone.center();
                let travel = zone_travel(
                    &from_coord,
                    &to_coord,
                    save.player_static_data.move_speed_mph,
                );
                let distance_m = round_distance(travel.distance_m);

                let new_position =
                    Position::new(to_zone.x, to_zone.y, to_zone.z, to_zone.zone_id.clone());
                save.map_snapshot.player_position = Some(new_position.clone());
                save.player_runtime_data.current_position = Some(new_position.clone());

                ensure_area(save);
                save.area_snapshot.materialize_zone(&to_zone);
                save.area_snapshot.enter_zone(to_zone.zone_id.clone());
                let advanced = save.area_snapshot.advance_clock(travel.duration_min, now)?;
                stamp_time_segment(&mut save.area_snapshot, &to_zone.zone_id, None);

                let summary = format!(
                    "{} moved from [{}] to [{}], taking {} minutes",
                    save.player_static_data.name, from_name, to_zone.name, travel.duration_min
                );
                let mut log_payload = LogPayload::new();
                log_payload.insert("to_zone_id".into(), Value::from(to_zone.zone_id.as_str()));
                log_payload.insert("to_zone_name".into(), Value::from(to_zone.name.clone()));
                log_payload.insert("duration_min".into(), Value::from(travel.duration_min));
                log_payload.insert("distance_m".into(), Value::from(distance_m));
                let entry = save.append_log(log_kinds::MOVE, summary.clone(), log_payload, now);

                let mut payload = LogPayload::new();
                payload.insert(
                    "from_zone_id".into(),
                    from_id.map_or(Value::Null, |id| Value::from(id.as_str())),
                );
                payload.insert("from_zone_name".into(), Value::from(from_name));
                payload.insert("from_coord".into(), coord_value(&from_coord));
                payload.insert("to_zone_id".into(), Value::from(to_zone.zone_id.as_str()));
                payload.insert("to_zone_name".into(), Value::from(to_zone.name.clone()));
                payload.insert("to_coord".into(), coord_value(&to_coord));
                payload.insert(
                    "to_zone_description".into(),
                    Value::from(to_zone.description.clone()),
                );
                payload.insert("distance_m".into(), Value::from(distance_m));
                payload.insert("duration_min".into(), Value::from(travel.duration_min));

                tracing::info!(
                    session_id = %save.session_id,
                    to_zone_id = %to_zone.zone_id,
                    duration_min = travel.duration_min,
                    "Moved to zone"
                );
                Ok(MoveToZoneResult {
                    new_position,
                    distance_m,
                    duration_min: travel.duration_min,
                    clock_after: advanced.new_time,
                    movement_log: MovementLog {
                        id: entry.id,
                        summary,
                        payload,
                    },
                })
            })
            .await
    }
}

fn coord_value(coord: &Coord3D) -> Value {
    json!({ "x": coord.x, "y": coord.y, "z": coord.z })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::SaveRepo;
    use crate::test_fixtures::{two_villages, TestStore};

    fn input(from: Option<&str>, to: &str) -> MoveToZoneInput {
        MoveToZoneInput {
            session_id: SessionId::default(),
            from_zone_id: from.map(ZoneId::from),
            to_zone_id: ZoneId::from(to),
        }
    }

    #[tokio::test]
    async fn move_advances_clock_by_travel_time() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToZone::new(Arc::clone(&store.sessions));

        let result = use_case
            .execute(input(Some("zone_0_0_0"), "zone_600_0_0"))
            .await
            .expect("move");
        assert_eq!(result.distance_m, 600.0);
        assert_eq!(result.duration_min, 8);
        assert_eq!(result.clock_after.display(), "1024-03-14 09:38");
        assert_eq!(result.new_position.zone_id.as_str(), "zone_600_0_0");
        assert_eq!(
            result.movement_log.summary,
            "Player moved from [Ashford] to [Brookhollow], taking 8 minutes"
        );

        let save = store.sessions.snapshot(&SessionId::default()).await.expect("snapshot");
        assert_eq!(
            save.area_snapshot.current_zone_id.as_ref().map(|z| z.as_str()),
            Some("zone_600_0_0")
        );
        assert!(save.area_snapshot.current_sub_zone_id.is_none());
        let last = save.game_logs.last().expect("log entry");
        assert_eq!(last.kind, log_kinds::MOVE);
        assert_eq!(last.id, result.movement_log.id);
    }

    #[tokio::test]
    async fn moving_in_place_costs_one_minute() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToZone::new(Arc::clone(&store.sessions));

        let result = use_case
            .execute(input(Some("zone_0_0_0"), "zone_0_0_0"))
            .await
            .expect("move");
        assert_eq!(result.distance_m, 0.0);
        assert_eq!(result.duration_min, 1);
    }

    #[tokio::test]
    async fn unknown_origin_uses_runtime_position() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToZone::new(Arc::clone(&store.sessions));

        let result = use_case
            .execute(input(Some("zone_9_9_9"), "zone_600_0_0"))
            .await
            .expect("move");
        assert_eq!(
            result.movement_log.payload.get("from_zone_name"),
            Some(&Value::from("Current position"))
        );
        assert_eq!(result.duration_min, 8);
    }

    #[tokio::test]
    async fn unknown_destination_is_zone_not_found() {
        let store = TestStore::new();
        store.seed_world(&SessionId::default(), two_villages(), true).await;
        let use_case = MoveToZone::new(Arc::clone(&store.sessions));

        let err = use_case
            .execute(input(None, "zone_1_1_1"))
            .await
            .expect_err("unknown zone");
        assert_eq!(err.code(), "ZONE_NOT_FOUND");
    }

    #[tokio::test]
    async fn uninitialized_clock_blocks_the_move_without_mutation() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), false).await;
        let before = store.sessions.snapshot(&id).await.expect("snapshot");
        let use_case = MoveToZone::new(Arc::clone(&store.sessions));

        let err = use_case
            .execute(input(Some("zone_0_0_0"), "zone_600_0_0"))
            .await
            .expect_err("no clock");
        assert_eq!(err, EngineError::ClockNotInitialized);
        assert_eq!(store.sessions.snapshot(&id).await.expect("snapshot"), before);
    }

    #[tokio::test]
    async fn concurrent_moves_serialize() {
        let store = TestStore::new();
        let id = SessionId::default();
        store.seed_world(&id, two_villages(), true).await;
        let use_case = Arc::new(MoveToZone::new(Arc::clone(&store.sessions)));

        let there = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move {
                use_case
                    .execute(input(Some("zone_0_0_0"), "zone_600_0_0"))
                    .await
            })
        };
        let back = {
            let use_case = Arc::clone(&use_case);
            tokio::spawn(async move {
                use_case
                    .execute(input(Some("zone_600_0_0"), "zone_0_0_0"))
                    .await
            })
        };
        there.await.expect("join").expect("move there");
        back.await.expect("join").expect("move back");

        let save = store.sessions.snapshot(&id).await.expect("snapshot");
        let clock = save.area_snapshot.clock.clone().expect("clock");
        assert_eq!(clock.display(), "1024-03-14 09:46");
        let moves = save
            .game_logs
            .iter()
            .filter(|e| e.kind == log_kinds::MOVE)
            .count();
        assert_eq!(moves, 2);

        let persisted = store
            .repo
            .load(&id)
            .expect("load")
            .expect("persisted save");
        assert_eq!(persisted, save);
    }
}
