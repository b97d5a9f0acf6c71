//! Region use cases: zone generation, validation and overlap resolution.

mod candidate;
mod fallback;
mod generator;
mod overlap;

pub use candidate::{validate_zone, ZoneCandidate};
pub use fallback::{fallback_sub_zone_seeds, fallback_zone};
pub use generator::{
    build_zones, zone_count, GenerateRegions, GenerateRegionsInput, GenerateRegionsResult,
};
pub use overlap::resolve_overlaps;

use std::sync::Arc;

use wrldkeep_domain::{AreaSnapshot, SaveFile};

/// Container for region use cases.
pub struct RegionUseCases {
    pub generate: Arc<GenerateRegions>,
}

impl RegionUseCases {
    pub fn new(generate: Arc<GenerateRegions>) -> Self {
        Self { generate }
    }
}

/// Materialize the area view from the stored map when it is missing.
///
/// Returns true when the area was rebuilt. The clock is carried over.
pub(crate) fn ensure_area(save: &mut SaveFile) -> bool {
    if !save.area_snapshot.zones.is_empty() || !save.map_snapshot.is_generated() {
        return false;
    }
    let player = save
        .map_snapshot
        .player_position
        .as_ref()
        .or(save.player_runtime_data.current_position.as_ref())
        .map(|p| (p.x as f64, p.y as f64));
    let clock = save.area_snapshot.clock.take();
    save.area_snapshot = AreaSnapshot::from_map(&save.map_snapshot.zones, player, clock);
    tracing::debug!(session_id = %save.session_id, "Rebuilt area from stored map");
    true
}
