//! Single-pass zone overlap resolution.

use wrldkeep_domain::MapZone;

/// Gap left between two zones after separating them, in meters.
const SEPARATION_MARGIN_M: f64 = 1.0;

/// Push zones apart in generation order.
///
/// Each zone is checked against every zone placed before it, in order, and
/// moved away from that zone's center until the circles are separated by the
/// margin. Coincident centers push along +x. There is no second pass: moving a
/// zone away from one neighbour can push it into another neighbour it was
/// already checked against, and that residual overlap is left as is.
///
/// Returns the number of displacements applied.
pub fn resolve_overlaps(zones: &mut [MapZone]) -> usize {
    let mut moves = 0;
    for i in 1..zones.len() {
        let (placed, rest) = zones.split_at_mut(i);
        let zone = &mut rest[0];
        for anchor in placed.iter() {
            let dx = (zone.x - anchor.x) as f64;
            let dy = (zone.y - anchor.y) as f64;
            let distance = (dx * dx + dy * dy).sqrt();
            let min_distance =
                f64::from(anchor.radius_m) + f64::from(zone.radius_m) + SEPARATION_MARGIN_M;
            if distance >= min_distance {
                continue;
            }

            if distance == 0.0 {
                zone.x += min_distance as i64;
            } else {
                let push = (min_distance - distance) / distance;
                zone.x = (zone.x as f64 + dx * push).round() as i64;
                zone.y = (zone.y as f64 + dy * push).round() as i64;
            }
            moves += 1;
            tracing::trace!(
                zone_id = %zone.zone_id,
                from = %anchor.zone_id,
                x = zone.x,
                y = zone.y,
                "Displaced overlapping zone"
            );
        }
    }
    moves
}
