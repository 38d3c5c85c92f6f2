//! Validation hook for client-reported positions

use crate::util::geometry::Point;

/// Decides where a player ends up after a move intent
pub trait MovementPolicy: Send {
    fn resolve(&self, current: Point, requested: Point) -> Point;
}

/// Accepts reported positions as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustClient;

impl MovementPolicy for TrustClient {
    fn resolve(&self, _current: Point, requested: Point) -> Point {
        requested
    }
}

/// Caps how far a single move intent may displace a player
#[derive(Debug, Clone, Copy)]
pub struct SpeedClamp {
    pub max_distance: f32,
}

impl MovementPolicy for SpeedClamp {
    fn resolve(&self, current: Point, requested: Point) -> Point {
        if !requested.is_finite() {
            return current;
        }

        let distance = current.distance_to(requested);
        if distance <= self.max_distance {
            return requested;
        }

        Point::from_polar(current, current.angle_to(requested), self.max_distance)
    }
}

/// Policy for the configured limit (`None` trusts the client)
pub fn policy_for(max_move_distance: Option<f32>) -> Box<dyn MovementPolicy> {
    match max_move_distance {
        Some(max_distance) => Box::new(SpeedClamp { max_distance }),
        None => Box::new(TrustClient),
    }
}
