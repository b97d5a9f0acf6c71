//! Movement use cases.

pub mod calculator;
mod move_to_sub_zone;
mod move_to_zone;

pub use calculator::{sub_zone_travel, zone_travel, Travel};
pub use move_to_sub_zone::{AreaPoint, MoveToSubZone, MoveToSubZoneInput, MoveToSubZoneResult};
pub use move_to_zone::{MovementLog, MoveToZone, MoveToZoneInput, MoveToZoneResult};

use std::sync::Arc;

use wrldkeep_domain::{AreaSnapshot, SubZoneId, ZoneId};

/// Container for movement use cases.
pub struct MovementUseCases {
    pub move_to_zone: Arc<MoveToZone>,
    pub move_to_sub_zone: Arc<MoveToSubZone>,
}

impl MovementUseCases {
    pub fn new(move_to_zone: Arc<MoveToZone>, move_to_sub_zone: Arc<MoveToSubZone>) -> Self {
        Self {
            move_to_zone,
            move_to_sub_zone,
        }
    }
}

/// Record the current time of day on the sub-zones the player just reached.
///
/// With `sub_zone_id` only that sub-zone is stamped, otherwise every
/// sub-zone of the zone.
pub(crate) fn stamp_time_segment(
    area: &mut AreaSnapshot,
    zone_id: &ZoneId,
    sub_zone_id: Option<&SubZoneId>,
) {
    let Some(segment) = area.clock.as_ref().map(|c| c.time_segment()) else {
        return;
    };
    for sub in area
        .sub_zones
        .iter_mut()
        .filter(|s| &s.zone_id == zone_id)
        .filter(|s| match sub_zone_id {
            Some(id) => &s.sub_zone_id == id,
            None => true,
        })
    {
        sub.state.time_segment = segment.to_string();
    }
}
