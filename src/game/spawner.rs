//! Random power-up spawning

use std::f32::consts::TAU;
use tracing::debug;

use crate::util::geometry::Point;

use super::random::RandomSource;
use super::world::{PowerUpId, PowerUpKind, World};

/// Per-tick spawn probability
pub const SPAWN_CHANCE: f32 = 0.005;
/// No spawns while this many power-ups exist
pub const MAX_POWER_UPS: usize = 10;
/// Spawns land within this fraction of the safe radius
pub const SPAWN_RADIUS_FRACTION: f32 = 0.8;

/// Spawning policy for health and ammo pickups
#[derive(Debug, Clone, Copy)]
pub struct PowerUpSpawner {
    pub chance: f32,
    pub max_active: usize,
}

impl Default for PowerUpSpawner {
    fn default() -> Self {
        Self {
            chance: SPAWN_CHANCE,
            max_active: MAX_POWER_UPS,
        }
    }
}

impl PowerUpSpawner {
    /// Roll for a spawn this tick
    pub fn tick(&self, world: &mut World, rng: &mut dyn RandomSource) -> Option<PowerUpId> {
        if world.power_ups.len() >= self.max_active || !rng.chance(self.chance) {
            return None;
        }

        let position = random_point_in_zone(world, rng, SPAWN_RADIUS_FRACTION);
        let kind = if rng.chance(0.5) {
            PowerUpKind::Health
        } else {
            PowerUpKind::Ammo
        };

        let id = world.add_power_up(kind, position);
        debug!(power_up_id = id, ?kind, x = position.x, y = position.y, "Power-up spawned");
        Some(id)
    }
}

/// Uniform angle and uniform distance within `fraction` of the safe radius
pub fn random_point_in_zone(world: &World, rng: &mut dyn RandomSource, fraction: f32) -> Point {
    let angle = rng.range(0.0, TAU);
    let distance = rng.range(0.0, world.zone.radius() * fraction);
    Point::from_polar(world.zone.center(), angle, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::random::ScriptedRandom;
    use crate::game::world::MapSize;

    #[test]
    fn test_spawns_on_successful_roll() {
        let mut world = World::new(MapSize::DEFAULT);
        // roll, angle 0, half of 800, health
        let mut rng = ScriptedRandom::new([0.001, 0.0, 0.5, 0.2]);

        let id = PowerUpSpawner::default().tick(&mut world, &mut rng).unwrap();
        let power_up = &world.power_ups[0];
        assert_eq!(power_up.id, id);
        assert_eq!(power_up.kind, PowerUpKind::Health);
        assert_eq!((power_up.x, power_up.y), (1400.0, 1000.0));
        assert_eq!(power_up.radius, 15.0);
    }

    #[test]
    fn test_ammo_on_upper_half() {
        let mut world = World::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.0, 0.7]);
        PowerUpSpawner::default().tick(&mut world, &mut rng);
        assert_eq!(world.power_ups[0].kind, PowerUpKind::Ammo);
    }

    #[test]
    fn test_failed_roll_spawns_nothing() {
        let mut world = World::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.005);
        assert!(PowerUpSpawner::default().tick(&mut world, &mut rng).is_none());
        assert!(world.power_ups.is_empty());
    }

    #[test]
    fn test_cap_is_respected() {
        let mut world = World::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.0);
        let spawner = PowerUpSpawner::default();
        for _ in 0..50 {
            spawner.tick(&mut world, &mut rng);
        }
        assert_eq!(world.power_ups.len(), MAX_POWER_UPS);
    }

    #[test]
    fn test_spawn_points_stay_inside_zone() {
        let mut world = World::new(MapSize::DEFAULT);
        world.zone.set_circle(Point::new(600.0, 700.0), 250.0);
        let mut rng = crate::game::random::world_rng(Some(7));
        let spawner = PowerUpSpawner {
            chance: 1.0,
            max_active: 100,
        };
        for _ in 0..100 {
            spawner.tick(&mut world, &mut rng);
        }
        for power_up in &world.power_ups {
            let d = Point::new(power_up.x, power_up.y).distance_to(Point::new(600.0, 700.0));
            assert!(d <= 200.0 + 1e-3);
        }
    }
}
