//! World entities and the store that owns them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::util::geometry::Point;

use super::zone::ZoneController;

/// Opaque connection id
pub type PlayerId = Uuid;

/// Power-up identity (monotonic counter)
pub type PowerUpId = u64;

pub const PLAYER_RADIUS: f32 = 20.0;
pub const MAX_HEALTH: i32 = 100;
pub const STARTING_AMMO: u32 = 30;
pub const POWER_UP_RADIUS: f32 = 15.0;

/// Player colors, assigned round-robin by join order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Cyan,
}

impl PlayerColor {
    pub const PALETTE: [PlayerColor; 8] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
        PlayerColor::Pink,
        PlayerColor::Cyan,
    ];

    /// Color for the n-th concurrently registered player
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// Authoritative player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: PlayerColor,
    /// 0-100 after healing; may dip below 0 until elimination runs
    pub health: i32,
    pub ammo: u32,
    /// Kill count
    pub score: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: PlayerColor, spawn: Point) -> Self {
        Self {
            id,
            name,
            x: spawn.x,
            y: spawn.y,
            radius: PLAYER_RADIUS,
            color,
            health: MAX_HEALTH,
            ammo: STARTING_AMMO,
            score: 0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Restore round-start stats at a fresh spawn point
    pub fn respawn(&mut self, spawn: Point) {
        self.health = MAX_HEALTH;
        self.ammo = STARTING_AMMO;
        self.score = 0;
        self.set_position(spawn);
    }
}

/// Projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Units per tick
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub player_id: PlayerId,
    pub damage: i32,
    pub radius: f32,
    pub range: f32,
    /// Cumulative distance travelled
    pub distance: f32,
}

impl Bullet {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Point {
        Point::new(self.velocity_x, self.velocity_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Health,
    Ammo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    pub radius: f32,
}

/// Playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: f32,
    pub height: f32,
}

impl MapSize {
    pub const DEFAULT: MapSize = MapSize {
        width: 2000.0,
        height: 2000.0,
    };

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the largest circle that fits the map
    pub fn initial_radius(&self) -> f32 {
        self.width.min(self.height) / 2.0
    }
}

/// Everything the tick loop simulates
pub struct World {
    pub players: HashMap<PlayerId, Player>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub zone: ZoneController,
    next_power_up_id: PowerUpId,
}

impl World {
    pub fn new(map_size: MapSize) -> Self {
        Self {
            players: HashMap::new(),
            bullets: Vec::new(),
            power_ups: Vec::new(),
            zone: ZoneController::new(map_size),
            next_power_up_id: 1,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn add_bullet(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
    }

    /// Place a power-up and return its id
    pub fn add_power_up(&mut self, kind: PowerUpKind, position: Point) -> PowerUpId {
        let id = self.next_power_up_id;
        self.next_power_up_id += 1;
        self.power_ups.push(PowerUp {
            id,
            x: position.x,
            y: position.y,
            kind,
            radius: POWER_UP_RADIUS,
        });
        id
    }

    /// Remove and return a power-up by id
    pub fn take_power_up(&mut self, id: PowerUpId) -> Option<PowerUp> {
        let index = self.power_ups.iter().position(|p| p.id == id)?;
        Some(self.power_ups.remove(index))
    }

    /// Drop all projectiles and pickups
    pub fn clear_items(&mut self) {
        self.bullets.clear();
        self.power_ups.clear();
    }
}
