//! World coordinates and distance/bearing geometry.

use serde::{Deserialize, Serialize};

/// Western edge of the world.
pub const WORLD_MIN_X: f64 = -1000.0;
/// Eastern edge of the world.
pub const WORLD_MAX_X: f64 = 2000.0;
/// Northern edge of the world.
pub const WORLD_MIN_Y: f64 = -1000.0;
/// Southern edge of the world.
pub const WORLD_MAX_Y: f64 = 1500.0;

/// A point in the shared 2D space.
///
/// Validation happens at the registry boundary: only finite coordinates
/// inside the world extents are ever stored or broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a position. No validation is applied here.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite and inside the world extents.
    pub fn in_world_bounds(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (WORLD_MIN_X..=WORLD_MAX_X).contains(&self.x)
            && (WORLD_MIN_Y..=WORLD_MAX_Y).contains(&self.y)
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing angle from this position toward another, in radians.
    ///
    /// Computed as `atan2(dy, dx)`: 0 points along +x, `PI/2` along +y.
    pub fn bearing_to(&self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_in_bounds() {
        assert!(Position::new(0.0, 0.0).in_world_bounds());
    }

    #[test]
    fn corners_are_in_bounds() {
        assert!(Position::new(WORLD_MIN_X, WORLD_MIN_Y).in_world_bounds());
        assert!(Position::new(WORLD_MAX_X, WORLD_MAX_Y).in_world_bounds());
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(!Position::new(-5000.0, 0.0).in_world_bounds());
        assert!(!Position::new(0.0, 1500.1).in_world_bounds());
    }

    #[test]
    fn non_finite_is_rejected() {
        assert!(!Position::new(f64::NAN, 0.0).in_world_bounds());
        assert!(!Position::new(0.0, f64::INFINITY).in_world_bounds());
        assert!(!Position::new(f64::NEG_INFINITY, 0.0).in_world_bounds());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bearing_points_along_axes() {
        let a = Position::new(0.0, 0.0);
        assert!((a.bearing_to(Position::new(10.0, 0.0)) - 0.0).abs() < 1e-12);
        assert!(
            (a.bearing_to(Position::new(0.0, 10.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12
        );
    }

    proptest::proptest! {
        #[test]
        fn distance_is_symmetric_and_non_negative(
            x1 in -1000.0f64..2000.0, y1 in -1000.0f64..1500.0,
            x2 in -1000.0f64..2000.0, y2 in -1000.0f64..1500.0,
        ) {
            let a = Position::new(x1, y1);
            let b = Position::new(x2, y2);
            proptest::prop_assert!(a.distance_to(b) >= 0.0);
            proptest::prop_assert!((a.distance_to(b) - b.distance_to(a)).abs() < 1e-9);
        }

        #[test]
        fn in_bounds_coordinates_are_accepted(
            x in -1000.0f64..=2000.0, y in -1000.0f64..=1500.0,
        ) {
            proptest::prop_assert!(Position::new(x, y).in_world_bounds());
        }
    }
}
