//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`;
//! notifications without a payload omit `data`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::game::world::{Bullet, MapSize, Player, PlayerId, PowerUp, PowerUpId};
use crate::util::geometry::Point;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Enter the arena with an optional display name
    Join(Option<String>),

    /// Client-reported position (trusted)
    Move(MoveIntent),

    /// Fire a bullet from the reported origin
    Shoot(ShootIntent),

    /// Pick up a power-up by id
    CollectPowerUp(PowerUpId),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveIntent {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShootIntent {
    pub x: f32,
    pub y: f32,
    /// Units per tick
    pub velocity_x: f32,
    pub velocity_y: f32,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Identity assigned to this connection
    SelfId(PlayerId),

    /// Complete world state (sent every tick)
    GameState(Box<GameSnapshot>),

    /// Safe zone entered a new phase
    PhaseChange(PhaseChange),

    /// Periodic countdown within a phase
    PhaseUpdate(PhaseUpdate),

    /// Recipient is standing outside the safe zone
    ZoneDamage(ZoneDamage),

    /// Recipient was eliminated
    Dead,

    /// Recipient is the last player standing
    Winner,

    /// The round was reset
    GameReset,
}

/// Full world snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: HashMap<PlayerId, Player>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub map_radius: f32,
    pub map_size: MapSize,
    pub shrink_phase: usize,
    /// Whole seconds until the next phase (0 in the final phase)
    pub next_phase_in: u32,
    pub next_circle_center: Option<Point>,
    pub next_circle_radius: Option<f32>,
    pub current_circle_center: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    pub phase: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_circle_center: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_circle_radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseUpdate {
    pub phase: usize,
    pub remaining_seconds: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDamage {
    pub damage: i32,
    pub message: String,
}
