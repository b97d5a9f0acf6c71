//! Map snapshot aggregate - The generated world map as handed to callers

use serde::{Deserialize, Serialize};

use crate::entities::{MapZone, Position};
use crate::ids::ZoneId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    #[serde(default)]
    pub player_position: Option<Position>,
    #[serde(default)]
    pub zones: Vec<MapZone>,
}

impl MapSnapshot {
    pub fn zone(&self, id: &ZoneId) -> Option<&MapZone> {
        self.zones.iter().find(|z| &z.zone_id == id)
    }

    pub fn is_generated(&self) -> bool {
        !self.zones.is_empty()
    }
}
