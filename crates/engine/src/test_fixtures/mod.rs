//! Shared helpers for use case and API tests.
//!
//! Every helper builds an isolated store on its own temp directory, so tests
//! never share persisted state.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use wrldkeep_domain::{
    AreaSnapshot, CalendarId, MapZone, Offset3, Position, SessionId, SubZoneSeed, ZoneId,
    ZoneSize, ZoneType,
};

use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::ports::{ClockPort, SaveRepo};
use crate::infrastructure::save_store::SaveStore;
use crate::stores::SessionStore;

/// The wall-clock instant every fixture uses.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// A session store over a real [`SaveStore`] in a temp directory.
pub struct TestStore {
    pub dir: TempDir,
    pub repo: Arc<SaveStore>,
    pub sessions: Arc<SessionStore>,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Arc::new(SaveStore::new(dir.path()));
        let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(fixed_now()));
        let sessions = Arc::new(SessionStore::new(
            Arc::clone(&repo) as Arc<dyn SaveRepo>,
            clock,
        ));
        Self {
            dir,
            repo,
            sessions,
        }
    }

    /// Install `zones` as the generated map, optionally with a running clock.
    pub async fn seed_world(&self, session_id: &SessionId, zones: Vec<MapZone>, with_clock: bool) {
        self.sessions
            .mutate(session_id, move |save, now| {
                let player = save
                    .player_runtime_data
                    .current_position
                    .clone()
                    .unwrap_or_else(Position::origin);
                let clock = with_clock.then(|| {
                    wrldkeep_domain::WorldClock::starting(CalendarId::default(), now)
                });
                save.area_snapshot =
                    AreaSnapshot::from_map(&zones, Some((player.x as f64, player.y as f64)), clock);
                save.map_snapshot.player_position = Some(player);
                save.map_snapshot.zones = zones;
                Ok(())
            })
            .await
            .expect("seed world");
    }
}

/// A small zone at `(x, y)` with the given seed offsets.
pub fn zone(name: &str, x: i64, y: i64, seeds: &[(&str, i64, i64, i64)]) -> MapZone {
    MapZone {
        zone_id: ZoneId::from_coords(x, y, 0),
        name: name.to_string(),
        x,
        y,
        z: 0,
        zone_type: ZoneType::Village,
        size: ZoneSize::Small,
        radius_m: 100,
        description: format!("{name} description"),
        tags: vec!["test".to_string()],
        sub_zones: seeds
            .iter()
            .map(|(seed_name, ox, oy, oz)| {
                SubZoneSeed::new(*seed_name, Offset3::new(*ox, *oy, *oz))
            })
            .collect(),
    }
}

/// Two villages 600 m apart, each with two sub-zones.
pub fn two_villages() -> Vec<MapZone> {
    vec![
        zone("Ashford", 0, 0, &[("Altar", 0, 0, 0), ("Well", 30, 40, 0)]),
        zone("Brookhollow", 600, 0, &[("Bridge", 0, 0, 0), ("Mill", -50, 0, 0)]),
    ]
}
