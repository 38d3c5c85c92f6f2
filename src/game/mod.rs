//! Game simulation modules

pub mod arena;
pub mod combat;
pub mod movement;
pub mod random;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod spawner;
pub mod world;
pub mod zone;

pub use arena::{Arena, ArenaHandle};
pub use simulation::Simulation;

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::util::time::unix_millis;
use crate::ws::protocol::ClientMsg;
use world::PlayerId;

/// Serialized notifications addressed to one connection
pub type DirectSender = mpsc::UnboundedSender<Arc<str>>;

/// What a connection asked the arena to do
#[derive(Debug, Clone)]
pub enum Intent {
    /// Register the channel for notifications addressed to this connection
    Connect(DirectSender),
    Client(ClientMsg),
    /// The connection closed
    Disconnect,
}

/// Intent received from a WebSocket connection
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: PlayerId,
    pub intent: Intent,
    pub received_at: u64,
}

impl PlayerInput {
    pub fn new(player_id: PlayerId, intent: Intent) -> Self {
        Self {
            player_id,
            intent,
            received_at: unix_millis(),
        }
    }
}
