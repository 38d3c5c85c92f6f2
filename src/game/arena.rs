//! Arena task: owns the simulation and drives the fixed-rate tick loop

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::util::time::{tick_duration, unix_millis, TICK_RATE};
use crate::ws::protocol::ServerMsg;

use super::simulation::{Recipient, Simulation};
use super::snapshot::SnapshotStats;
use super::world::PlayerId;
use super::{DirectSender, Intent, PlayerInput};

/// Ticks between snapshot size reports
const STATS_LOG_INTERVAL: u64 = TICK_RATE as u64 * 30;

/// Handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    broadcast_tx: broadcast::Sender<Arc<str>>,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
}

impl ArenaHandle {
    /// Receive every broadcast notification from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.broadcast_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }
}

/// The authoritative arena
pub struct Arena {
    sim: Simulation,
    input_rx: mpsc::Receiver<PlayerInput>,
    broadcast_tx: broadcast::Sender<Arc<str>>,
    /// Per-connection channels; unlike the broadcast these never drop
    connections: HashMap<PlayerId, DirectSender>,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
    stats: SnapshotStats,
}

impl Arena {
    pub fn new(sim: Simulation) -> (Self, ArenaHandle) {
        let (input_tx, input_rx) = mpsc::channel(1024);
        let (broadcast_tx, _) = broadcast::channel(256);
        let player_count = Arc::new(AtomicUsize::new(0));
        let tick = Arc::new(AtomicU64::new(0));

        let handle = ArenaHandle {
            input_tx,
            broadcast_tx: broadcast_tx.clone(),
            player_count: player_count.clone(),
            tick: tick.clone(),
        };

        let arena = Self {
            sim,
            input_rx,
            broadcast_tx,
            connections: HashMap::new(),
            player_count,
            tick,
            stats: SnapshotStats::default(),
        };

        (arena, handle)
    }

    /// Run until every input sender is dropped.
    ///
    /// Intents are applied the moment they arrive; the simulation is stepped
    /// on a fixed interval. Both run on this task, so no locking is needed.
    pub async fn run(mut self) {
        info!(tick_rate = TICK_RATE, "Arena started");

        let mut tick_interval = interval(tick_duration());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    self.sim.step(unix_millis());
                    self.flush();
                    self.log_stats();
                }
                input = self.input_rx.recv() => match input {
                    Some(input) => {
                        self.apply(input);
                        self.flush();
                    }
                    None => {
                        info!("Input channel closed, stopping arena");
                        break;
                    }
                },
            }
        }
    }

    fn apply(&mut self, input: PlayerInput) {
        debug!(
            player_id = %input.player_id,
            latency_ms = unix_millis().saturating_sub(input.received_at),
            "Applying intent"
        );
        match input.intent {
            Intent::Connect(direct_tx) => {
                self.connections.insert(input.player_id, direct_tx);
            }
            Intent::Client(msg) => self.sim.handle_intent(input.player_id, msg),
            Intent::Disconnect => {
                self.connections.remove(&input.player_id);
                self.sim.handle_disconnect(input.player_id);
            }
        }
    }

    /// Serialize pending notifications and route them
    fn flush(&mut self) {
        for outbound in self.sim.drain_outbound() {
            let payload = match serde_json::to_string(&outbound.msg) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "Failed to serialize outbound message");
                    continue;
                }
            };

            if let ServerMsg::GameState(snapshot) = &outbound.msg {
                self.stats.record(snapshot.players.len(), payload.len());
            }

            match outbound.recipient {
                Recipient::All => {
                    // No receivers just means nobody is connected
                    let _ = self.broadcast_tx.send(payload.into());
                }
                Recipient::Player(player_id) => match self.connections.get(&player_id) {
                    Some(direct_tx) => {
                        if direct_tx.send(payload.into()).is_err() {
                            debug!(player_id = %player_id, "Connection gone, dropping notification");
                        }
                    }
                    None => debug!(player_id = %player_id, "No connection for notification"),
                },
            }
        }

        self.player_count
            .store(self.sim.player_count(), Ordering::Relaxed);
        self.tick.store(self.sim.tick_count(), Ordering::Relaxed);
    }

    fn log_stats(&self) {
        if self.sim.tick_count() % STATS_LOG_INTERVAL != 0 {
            return;
        }
        let world = self.sim.world();
        debug!(
            snapshots = self.stats.total_snapshots,
            avg_bytes = self.stats.avg_bytes(),
            avg_players = self.stats.avg_players_per_snapshot,
            connections = self.connections.len(),
            bullets = world.bullets.len(),
            power_ups = world.power_ups.len(),
            zone_phase = world.zone.phase(),
            zone_radius = world.zone.radius(),
            zone_moving = world.zone.is_moving(),
            "Snapshot stats"
        );
    }
}
