//! Distance and travel-time arithmetic.
//!
//! Speeds are meters per hour. A speed of zero is treated as 1 m/h.

use serde::Serialize;
use wrldkeep_domain::Coord3D;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Travel {
    pub distance_m: f64,
    pub duration_min: u32,
}

impl Travel {
    pub const NONE: Travel = Travel {
        distance_m: 0.0,
        duration_min: 0,
    };
}

/// Whole minutes needed to cover `distance_m`, rounded up.
///
/// Hours first, then minutes: 2325 m at 4500 m/h is 32 minutes, not 31.
fn minutes_for(distance_m: f64, speed_m_per_h: u32) -> u32 {
    let speed = f64::from(speed_m_per_h.max(1));
    let minutes = (distance_m / speed * 60.0).ceil();
    if minutes.is_finite() && minutes > 0.0 {
        minutes.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Zone-to-zone travel: planar distance, at least one minute.
pub fn zone_travel(from: &Coord3D, to: &Coord3D, speed_m_per_h: u32) -> Travel {
    let distance_m = from.distance_2d(to);
    Travel {
        distance_m,
        duration_min: minutes_for(distance_m, speed_m_per_h).max(1),
    }
}

/// Sub-zone travel: 3D distance, zero minutes allowed.
///
/// Without a known origin the move is free.
pub fn sub_zone_travel(from: Option<&Coord3D>, to: &Coord3D, speed_m_per_h: u32) -> Travel {
    match from {
        Some(from) => {
            let distance_m = from.distance_3d(to);
            Travel {
                distance_m,
                duration_min: minutes_for(distance_m, speed_m_per_h),
            }
        }
        None => Travel::NONE,
    }
}

/// Round to millimeters for reporting.
pub fn round_distance(distance_m: f64) -> f64 {
    (distance_m * 1000.0).round() / 1000.0
}
