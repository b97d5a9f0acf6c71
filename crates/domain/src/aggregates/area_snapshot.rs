//! Area snapshot aggregate - The navigable world the engine mutates
//!
//! Holds every materialized zone and sub-zone, the player's current zone and
//! sub-zone, and the world clock. All movement, discovery and interaction
//! operations go through this aggregate.
//!
//! # Invariants
//!
//! - Each sub-zone lies within its owning zone's radius
//! - `current_sub_zone_id`, when set, belongs to `current_zone_id`
//! - Interaction ids and case-insensitive names are unique per sub-zone
//!
//! `check_invariants` verifies all three.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{AreaNpc, AreaSubZone, AreaZone, Interaction, MapZone};
use crate::error::DomainError;
use crate::geometry::Coord3D;
use crate::ids::{InteractionId, SubZoneId, ZoneId};
use crate::value_objects::CalendarId;
use crate::world_clock::WorldClock;

/// Slack for float rounding when checking containment.
const CONTAINMENT_EPSILON_M: f64 = 1e-6;

/// Result of advancing the world clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAdvanceResult {
    pub previous_time: WorldClock,
    pub new_time: WorldClock,
    pub minutes_advanced: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSnapshot {
    #[serde(default = "default_area_version")]
    pub version: String,
    #[serde(default)]
    pub zones: Vec<AreaZone>,
    #[serde(default)]
    pub sub_zones: Vec<AreaSubZone>,
    #[serde(default)]
    pub current_zone_id: Option<ZoneId>,
    #[serde(default)]
    pub current_sub_zone_id: Option<SubZoneId>,
    /// `None` until the clock is initialized
    #[serde(default)]
    pub clock: Option<WorldClock>,
}

fn default_area_version() -> String {
    "0.1.0".to_string()
}

impl Default for AreaSnapshot {
    fn default() -> Self {
        Self {
            version: default_area_version(),
            zones: Vec::new(),
            sub_zones: Vec::new(),
            current_zone_id: None,
            current_sub_zone_id: None,
            clock: None,
        }
    }
}

impl AreaSnapshot {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Materialize the area view of a generated map.
    ///
    /// Every seed becomes a sub-zone with a pre-generated observe interaction
    /// and one NPC stub. The current zone is the one containing `player`
    /// (else the first zone) and no sub-zone is selected. `clock` is carried
    /// over unchanged.
    pub fn from_map(zones: &[MapZone], player: Option<(f64, f64)>, clock: Option<WorldClock>) -> Self {
        let mut snapshot = Self {
            clock,
            ..Self::default()
        };
        for zone in zones {
            snapshot.materialize_zone(zone);
        }
        snapshot.current_zone_id = player
            .and_then(|(x, y)| zones.iter().find(|z| z.contains_point(x, y)))
            .or_else(|| zones.first())
            .map(|z| z.zone_id.clone());
        snapshot
    }

    /// Add the area view of `zone` if it is not present yet.
    ///
    /// Returns the id of the zone's first sub-zone, if it has any.
    pub fn materialize_zone(&mut self, zone: &MapZone) -> Option<SubZoneId> {
        if let Some(existing) = self.zone(&zone.zone_id) {
            return existing.sub_zone_ids.first().cloned();
        }

        let mut area_zone = AreaZone::from_map_zone(zone);
        for (idx, seed) in zone.sub_zones.iter().enumerate() {
            let n = idx + 1;
            let seed = seed.clone().clipped_to(zone.radius_m);
            let sub_zone_id = SubZoneId::for_zone(&zone.zone_id, n);
            let coord = Coord3D::new(
                area_zone.center.x + seed.offset_x as f64,
                area_zone.center.y + seed.offset_y as f64,
                area_zone.center.z + seed.offset_z as f64,
            );
            let description = if seed.description.trim().is_empty() {
                zone.description.clone()
            } else {
                seed.description.clone()
            };

            let mut sub_zone = AreaSubZone::new(
                sub_zone_id.clone(),
                zone.zone_id.clone(),
                seed.name,
                coord,
                description,
            );
            sub_zone
                .key_interactions
                .push(Interaction::observe_surroundings(InteractionId::from_string(
                    format!("int_{}_{}_observe", zone.zone_id, n),
                )));
            sub_zone
                .npcs
                .push(AreaNpc::stub_for(&zone.name, &sub_zone_id, 0));

            area_zone.sub_zone_ids.push(sub_zone_id);
            self.sub_zones.push(sub_zone);
        }

        let first = area_zone.sub_zone_ids.first().cloned();
        self.zones.push(area_zone);
        first
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn zone(&self, id: &ZoneId) -> Option<&AreaZone> {
        self.zones.iter().find(|z| &z.zone_id == id)
    }

    pub fn sub_zone(&self, id: &SubZoneId) -> Option<&AreaSubZone> {
        self.sub_zones.iter().find(|s| &s.sub_zone_id == id)
    }

    pub fn sub_zone_mut(&mut self, id: &SubZoneId) -> Option<&mut AreaSubZone> {
        self.sub_zones.iter_mut().find(|s| &s.sub_zone_id == id)
    }

    /// Find an interaction anywhere in the area, with its sub-zone.
    pub fn find_interaction(&self, id: &InteractionId) -> Option<(&AreaSubZone, &Interaction)> {
        self.sub_zones
            .iter()
            .find_map(|s| s.interaction(id).map(|i| (s, i)))
    }

    pub fn is_clock_initialized(&self) -> bool {
        self.clock.is_some()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Initialize the clock if it is not already running.
    ///
    /// Returns the clock in effect afterwards and whether it was created now.
    /// An existing clock is never rewound or replaced.
    pub fn init_clock(&mut self, calendar: CalendarId, now: DateTime<Utc>) -> (WorldClock, bool) {
        match &self.clock {
            Some(existing) => (existing.clone(), false),
            None => {
                let clock = WorldClock::starting(calendar, now);
                self.clock = Some(clock.clone());
                (clock, true)
            }
        }
    }

    /// Advance the clock by `minutes`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ClockNotRunning` when the clock is uninitialized.
    pub fn advance_clock(
        &mut self,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<TimeAdvanceResult, DomainError> {
        let clock = self.clock.as_mut().ok_or(DomainError::ClockNotRunning)?;
        let previous_time = clock.clone();
        clock.advance_minutes(minutes, now);
        Ok(TimeAdvanceResult {
            previous_time,
            new_time: clock.clone(),
            minutes_advanced: minutes,
        })
    }

    /// Enter a zone without selecting a sub-zone.
    pub fn enter_zone(&mut self, zone_id: ZoneId) {
        self.current_zone_id = Some(zone_id);
        self.current_sub_zone_id = None;
    }

    /// Stand in a sub-zone, which also selects its owning zone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown sub-zone.
    pub fn enter_sub_zone(&mut self, sub_zone_id: &SubZoneId) -> Result<(), DomainError> {
        let zone_id = self
            .sub_zone(sub_zone_id)
            .map(|s| s.zone_id.clone())
            .ok_or_else(|| DomainError::not_found("SubZone", sub_zone_id.as_str()))?;
        self.current_zone_id = Some(zone_id);
        self.current_sub_zone_id = Some(sub_zone_id.clone());
        Ok(())
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Verify containment, current-position consistency and interaction uniqueness.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        for sub_zone in &self.sub_zones {
            let zone = self.zone(&sub_zone.zone_id).ok_or_else(|| {
                DomainError::invariant(format!(
                    "sub-zone {} references missing zone {}",
                    sub_zone.sub_zone_id, sub_zone.zone_id
                ))
            })?;
            let offset = zone.center.distance_3d(&sub_zone.coord);
            if offset > f64::from(zone.radius_m) + CONTAINMENT_EPSILON_M {
                return Err(DomainError::invariant(format!(
                    "sub-zone {} lies {:.1} m from the center of {} (radius {} m)",
                    sub_zone.sub_zone_id, offset, zone.zone_id, zone.radius_m
                )));
            }
            if let Some(duplicate) = sub_zone.find_duplicate_interaction() {
                return Err(DomainError::invariant(format!(
                    "sub-zone {}: {}",
                    sub_zone.sub_zone_id, duplicate
                )));
            }
        }

        if let Some(current_sub) = &self.current_sub_zone_id {
            let sub_zone = self.sub_zone(current_sub).ok_or_else(|| {
                DomainError::invariant(format!("current sub-zone {} does not exist", current_sub))
            })?;
            if self.current_zone_id.as_ref() != Some(&sub_zone.zone_id) {
                return Err(DomainError::invariant(format!(
                    "current sub-zone {} is not inside the current zone",
                    current_sub
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SubZoneSeed;
    use crate::geometry::Offset3;
    use crate::value_objects::{ZoneSize, ZoneType};

    fn map_zone(x: i64, y: i64, radius_m: u32) -> MapZone {
        MapZone {
            zone_id: ZoneId::from_coords(x, y, 0),
            name: format!("Zone at {x}"),
            x,
            y,
            z: 0,
            zone_type: ZoneType::Forest,
            size: ZoneSize::Small,
            radius_m,
            description: "Pines".to_string(),
            tags: vec![],
            sub_zones: vec![
                SubZoneSeed::new("Clearing", Offset3::new(20, 0, 0)),
                SubZoneSeed::new("Creek", Offset3::new(0, -30, 0)).with_description("Cold water"),
                SubZoneSeed::new("Ridge", Offset3::new(500, 0, 0)),
            ],
        }
    }

    #[test]
    fn from_map_materializes_sub_zones() {
        let zones = vec![map_zone(0, 0, 80), map_zone(400, 0, 80)];
        let snapshot = AreaSnapshot::from_map(&zones, Some((410.0, 5.0)), None);

        assert_eq!(snapshot.zones.len(), 2);
        assert_eq!(snapshot.sub_zones.len(), 6);
        assert_eq!(snapshot.current_zone_id, Some(ZoneId::from("zone_400_0_0")));
        assert_eq!(snapshot.current_sub_zone_id, None);

        let first = &snapshot.sub_zones[0];
        assert_eq!(first.sub_zone_id.as_str(), "sub_zone_0_0_0_1");
        assert_eq!(first.description, "Pines");
        assert_eq!(
            first.key_interactions[0].interaction_id.as_str(),
            "int_zone_0_0_0_1_observe"
        );
        assert_eq!(first.npcs.len(), 1);
        assert_eq!(snapshot.sub_zones[1].description, "Cold water");
        assert_eq!(snapshot.sub_zones[2].coord, Coord3D::new(80.0, 0.0, 0.0));
        assert!(snapshot.check_invariants().is_ok());
    }

    #[test]
    fn current_zone_falls_back_to_first() {
        let zones = vec![map_zone(0, 0, 80)];
        let snapshot = AreaSnapshot::from_map(&zones, Some((5000.0, 0.0)), None);
        assert_eq!(snapshot.current_zone_id, Some(ZoneId::from("zone_0_0_0")));
    }

    #[test]
    fn init_clock_does_not_rewind() {
        let mut snapshot = AreaSnapshot::default();
        let now = Utc::now();
        let (first, created) = snapshot.init_clock(CalendarId::default(), now);
        assert!(created);
        assert!(snapshot.advance_clock(45, now).is_ok());
        let (second, created) = snapshot.init_clock(CalendarId::default(), now);
        assert!(!created);
        assert_eq!(second.absolute_minutes() - first.absolute_minutes(), 45);
    }

    #[test]
    fn advance_requires_clock() {
        let mut snapshot = AreaSnapshot::default();
        assert!(snapshot.advance_clock(1, Utc::now()).is_err());
    }

    #[test]
    fn invariant_violations_are_reported() {
        let zones = vec![map_zone(0, 0, 80), map_zone(400, 0, 80)];
        let mut snapshot = AreaSnapshot::from_map(&zones, None, None);

        snapshot.current_zone_id = Some(ZoneId::from("zone_400_0_0"));
        snapshot.current_sub_zone_id = Some(SubZoneId::from("sub_zone_0_0_0_1"));
        assert!(snapshot.check_invariants().is_err());

        let mut snapshot = AreaSnapshot::from_map(&zones, None, None);
        snapshot.sub_zones[0].coord = Coord3D::new(500.0, 0.0, 0.0);
        assert!(snapshot.check_invariants().is_err());

        let mut snapshot = AreaSnapshot::from_map(&zones, None, None);
        let dup = snapshot.sub_zones[0].key_interactions[0].clone();
        snapshot.sub_zones[0].key_interactions.push(dup);
        assert!(snapshot.check_invariants().is_err());
    }

    #[test]
    fn enter_sub_zone_selects_owning_zone() {
        let zones = vec![map_zone(0, 0, 80), map_zone(400, 0, 80)];
        let mut snapshot = AreaSnapshot::from_map(&zones, None, None);
        let target = SubZoneId::from("sub_zone_400_0_0_2");
        assert!(snapshot.enter_sub_zone(&target).is_ok());
        assert_eq!(snapshot.current_zone_id, Some(ZoneId::from("zone_400_0_0")));
        assert!(snapshot.check_invariants().is_ok());
        assert!(snapshot
            .enter_sub_zone(&SubZoneId::from("sub_missing"))
            .is_err());
    }
}
