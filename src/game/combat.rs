//! Combat system - bullets, hit detection, zone damage

use tracing::debug;

use crate::util::geometry::{circles_overlap, Point};

use super::world::{Bullet, PlayerId, World};

pub const BULLET_DAMAGE: i32 = 10;
pub const BULLET_RADIUS: f32 = 5.0;
pub const BULLET_RANGE: f32 = 1000.0;

impl Bullet {
    /// Fresh bullet fired by `owner` from `origin` with a per-tick velocity
    pub fn new(owner: PlayerId, origin: Point, velocity: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            velocity_x: velocity.x,
            velocity_y: velocity.y,
            player_id: owner,
            damage: BULLET_DAMAGE,
            radius: BULLET_RADIUS,
            range: BULLET_RANGE,
            distance: 0.0,
        }
    }

    /// Move one tick along the velocity and accumulate travel
    pub fn advance(&mut self) {
        self.x += self.velocity_x;
        self.y += self.velocity_y;
        self.distance += self.velocity().length();
    }
}

/// A bullet striking a player
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub shooter_id: PlayerId,
    pub target_id: PlayerId,
    pub damage: i32,
    pub target_killed: bool,
}

/// Zone damage dealt to one player
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneHit {
    pub player_id: PlayerId,
    pub damage: i32,
    pub killed: bool,
}

/// Combat system for bullets and the zone hazard
pub struct CombatSystem;

impl CombatSystem {
    /// Integrate every bullet by one tick and resolve collisions.
    ///
    /// Bullets leaving the safe zone or exhausting their range are dropped
    /// without dealing damage. A bullet hits at most one player per tick: the
    /// first overlapping non-shooter in iteration order. Players already at or
    /// below zero health this tick are not hit again.
    pub fn advance_bullets(world: &mut World) -> Vec<HitResult> {
        let mut hits = Vec::new();
        let zone_center = world.zone.center();
        let zone_radius = world.zone.radius();

        let mut bullets = std::mem::take(&mut world.bullets);
        bullets.retain_mut(|bullet| {
            bullet.advance();

            let position = bullet.position();
            if !position.is_finite() || !bullet.distance.is_finite() {
                debug!(owner = %bullet.player_id, "Dropping bullet with non-finite state");
                return false;
            }

            // Travel already includes this step, so a bullet with speed S lives at most ceil(range / S) ticks
            if position.distance_to(zone_center) > zone_radius || bullet.distance >= bullet.range {
                return false;
            }

            let target = world.players.values_mut().find(|player| {
                player.id != bullet.player_id
                    && !player.is_dead()
                    && circles_overlap(position, bullet.radius, player.position(), player.radius)
            });

            match target {
                Some(player) => {
                    player.health -= bullet.damage;
                    hits.push(HitResult {
                        shooter_id: bullet.player_id,
                        target_id: player.id,
                        damage: bullet.damage,
                        target_killed: player.is_dead(),
                    });
                    false
                }
                None => true,
            }
        });
        world.bullets = bullets;

        hits
    }

    /// Zone damage for a player `distance_outside` units beyond the edge
    pub fn zone_damage(distance_outside: f32, phase: usize) -> i32 {
        let phase_multiplier = 1.0 + phase as f32 * 0.5;
        let distance_factor = distance_outside / 100.0;
        ((phase_multiplier * (1.0 + distance_factor)).floor() as i32).max(1)
    }

    /// Damage every player standing outside the safe zone
    pub fn apply_zone_hazard(world: &mut World) -> Vec<ZoneHit> {
        let phase = world.zone.phase();
        let zone = &world.zone;

        world
            .players
            .values_mut()
            .filter_map(|player| {
                let outside = zone.distance_outside(player.position())?;
                let damage = Self::zone_damage(outside, phase);
                player.health -= damage;
                Some(ZoneHit {
                    player_id: player.id,
                    damage,
                    killed: player.is_dead(),
                })
            })
            .collect()
    }
}
