//! Planar geometry helpers shared by the simulation

use serde::{Deserialize, Serialize};

/// A point (or vector) in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from `origin` along `angle` (radians)
    pub fn from_polar(origin: Point, angle: f32, distance: f32) -> Self {
        Self {
            x: origin.x + angle.cos() * distance,
            y: origin.y + angle.sin() * distance,
        }
    }

    /// Vector magnitude
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Point) -> f32 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Angle (radians) of the ray from `self` towards `other`
    pub fn angle_to(self, other: Point) -> f32 {
        angle(self.x, self.y, other.x, other.y)
    }

    /// Component-wise linear interpolation towards `target`
    pub fn lerp(self, target: Point, t: f32) -> Self {
        Self {
            x: lerp(self.x, target.x, t),
            y: lerp(self.y, target.y, t),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in radians from the first point to the second
pub fn angle(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (y2 - y1).atan2(x2 - x1)
}

/// Linear interpolation: `start` at t = 0, `end` at t = 1
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

/// True when two circles overlap (touching does not count)
pub fn circles_overlap(a: Point, radius_a: f32, b: Point, radius_b: f32) -> bool {
    a.distance_to(b) < radius_a + radius_b
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_distance() {
        assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance_to(Point::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_angle() {
        assert_eq!(angle(0.0, 0.0, 1.0, 0.0), 0.0);
        assert!((angle(0.0, 0.0, 0.0, 1.0) - FRAC_PI_2).abs() < 1e-6);
        assert!((Point::new(0.0, 0.0).angle_to(Point::new(-1.0, 0.0)) - PI).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);

        let p = Point::new(0.0, 0.0).lerp(Point::new(100.0, -50.0), 0.25);
        assert_eq!(p, Point::new(25.0, -12.5));
    }

    #[test]
    fn test_from_polar() {
        let p = Point::from_polar(Point::new(10.0, 10.0), 0.0, 5.0);
        assert_eq!(p, Point::new(15.0, 10.0));
        let q = Point::from_polar(Point::new(0.0, 0.0), FRAC_PI_2, 2.0);
        assert!(q.x.abs() < 1e-6);
        assert!((q.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_circles_overlap() {
        let a = Point::new(0.0, 0.0);
        assert!(circles_overlap(a, 20.0, Point::new(24.0, 0.0), 5.0));
        // Exactly touching is not a hit
        assert!(!circles_overlap(a, 20.0, Point::new(25.0, 0.0), 5.0));
    }
}
