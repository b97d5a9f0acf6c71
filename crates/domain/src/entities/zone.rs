//! Zone entities - Generated regions of the world map
//!
//! A zone exists in two shapes:
//! - `MapZone` in the map snapshot, as generated (integer center, sub-zone seeds)
//! - `AreaZone` in the area snapshot, which the engine navigates (float center,
//!   materialized sub-zone ids, runtime state)

use serde::{Deserialize, Serialize};

use crate::geometry::{Coord3D, Offset3};
use crate::ids::{SubZoneId, ZoneId};
use crate::value_objects::{ZoneSize, ZoneType};

/// A named point of interest inside a zone, relative to its center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubZoneSeed {
    pub name: String,
    #[serde(default)]
    pub offset_x: i64,
    #[serde(default)]
    pub offset_y: i64,
    #[serde(default)]
    pub offset_z: i64,
    #[serde(default)]
    pub description: String,
}

impl SubZoneSeed {
    pub fn new(name: impl Into<String>, offset: Offset3) -> Self {
        Self {
            name: name.into(),
            offset_x: offset.x,
            offset_y: offset.y,
            offset_z: offset.z,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn offset(&self) -> Offset3 {
        Offset3::new(self.offset_x, self.offset_y, self.offset_z)
    }

    /// Same seed with its offset clipped onto a sphere of `radius_m`.
    pub fn clipped_to(mut self, radius_m: u32) -> Self {
        let clipped = self.offset().clipped_to(radius_m);
        self.offset_x = clipped.x;
        self.offset_y = clipped.y;
        self.offset_z = clipped.z;
        self
    }
}

/// A zone as stored in the map snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapZone {
    pub zone_id: ZoneId,
    pub name: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub z: i64,
    #[serde(default)]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub size: ZoneSize,
    #[serde(default = "default_zone_radius")]
    pub radius_m: u32,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sub_zones: Vec<SubZoneSeed>,
}

fn default_zone_radius() -> u32 {
    120
}

impl MapZone {
    pub fn center(&self) -> Coord3D {
        Coord3D::new(self.x as f64, self.y as f64, self.z as f64)
    }

    /// Whether `(x, y)` lies inside this zone's circle on the plane.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.center().distance_2d(&Coord3D::new(x, y, 0.0)) <= f64::from(self.radius_m)
    }
}

/// Runtime state of a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
    /// Clock display string from the last refresh, empty if never refreshed
    #[serde(default)]
    pub last_refresh_clock: String,
}

impl Default for ZoneState {
    fn default() -> Self {
        Self {
            flags: default_flags(),
            last_refresh_clock: String::new(),
        }
    }
}

pub(crate) fn default_flags() -> Vec<String> {
    vec!["normal".to_string()]
}

/// A zone as navigated in the area snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaZone {
    pub zone_id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub size: ZoneSize,
    pub center: Coord3D,
    #[serde(default = "default_zone_radius")]
    pub radius_m: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sub_zone_ids: Vec<SubZoneId>,
    #[serde(default)]
    pub state: ZoneState,
}

impl AreaZone {
    /// Area view of a map zone, without any sub-zones attached yet.
    pub fn from_map_zone(zone: &MapZone) -> Self {
        Self {
            zone_id: zone.zone_id.clone(),
            name: zone.name.clone(),
            zone_type: zone.zone_type,
            size: zone.size,
            center: zone.center(),
            radius_m: zone.radius_m,
            description: zone.description.clone(),
            sub_zone_ids: Vec::new(),
            state: ZoneState::default(),
        }
    }
}
