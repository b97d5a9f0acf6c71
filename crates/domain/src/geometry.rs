//! Plane and space geometry for zones and sub-zones.
//!
//! World units are meters. Zone centers are stored as integers in the map
//! snapshot and as floats in the area snapshot.

use serde::{Deserialize, Serialize};

/// A point in world space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Coord3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance ignoring the vertical axis.
    pub fn distance_2d(&self, other: &Coord3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Full Euclidean distance including the vertical offset.
    pub fn distance_3d(&self, other: &Coord3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// An integer offset relative to a zone center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset3 {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Offset3 {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt()
    }

    /// Scale the vector down onto the sphere of `radius_m`, keeping direction.
    ///
    /// Vectors already inside the radius are returned unchanged. The result
    /// never exceeds `radius_m`: if rounding to whole meters would push it
    /// past the boundary, components are truncated toward zero instead.
    pub fn clipped_to(self, radius_m: u32) -> Self {
        let max_dist = f64::from(radius_m.max(1));
        let dist = self.magnitude();
        if dist <= max_dist {
            return self;
        }

        let ratio = max_dist / dist;
        let scale = |v: i64, round: bool| {
            let scaled = v as f64 * ratio;
            if round {
                scaled.round() as i64
            } else {
                scaled.trunc() as i64
            }
        };

        let rounded = Self::new(
            scale(self.x, true),
            scale(self.y, true),
            scale(self.z, true),
        );
        if rounded.magnitude() <= max_dist {
            return rounded;
        }
        Self::new(
            scale(self.x, false),
            scale(self.y, false),
            scale(self.z, false),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_2d_ignores_height() {
        let a = Coord3D::new(0.0, 0.0, 0.0);
        let b = Coord3D::new(3.0, 4.0, 100.0);
        assert_eq!(a.distance_2d(&b), 5.0);
        assert!(a.distance_3d(&b) > 100.0);
    }

    #[test]
    fn offset_inside_radius_is_untouched() {
        let offset = Offset3::new(30, -40, 0);
        assert_eq!(offset.clipped_to(50), offset);
    }

    #[test]
    fn offset_outside_radius_is_clipped_preserving_direction() {
        let clipped = Offset3::new(300, 400, 0).clipped_to(100);
        assert_eq!(clipped, Offset3::new(60, 80, 0));
    }

    #[test]
    fn clipped_offset_never_exceeds_radius() {
        for (x, y, z) in [(997, 13, 0), (-611, 707, 3), (1, 999, -250), (-999, -999, 999)] {
            for radius in [60_u32, 61, 137, 299, 500] {
                let clipped = Offset3::new(x, y, z).clipped_to(radius);
                assert!(
                    clipped.magnitude() <= f64::from(radius),
                    "({x},{y},{z}) clipped to {radius} gave {clipped:?}"
                );
                if clipped.x != 0 {
                    assert_eq!(clipped.x.signum(), x.signum());
                }
                if clipped.y != 0 {
                    assert_eq!(clipped.y.signum(), y.signum());
                }
            }
        }
    }
}
