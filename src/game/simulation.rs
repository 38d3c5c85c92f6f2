//! Authoritative world simulation, single-stepped by the arena loop

use crate::util::time::secs_to_ticks;
use crate::ws::protocol::{GameSnapshot, PhaseChange, ServerMsg, ZoneDamage};

use super::combat::CombatSystem;
use super::movement::MovementPolicy;
use super::random::RandomSource;
use super::spawner::PowerUpSpawner;
use super::world::{MapSize, PlayerId, World};

/// Delay between a round reset and the "game started" announcement
pub const START_ANNOUNCEMENT_DELAY_TICKS: u32 = secs_to_ticks(2);

pub const GAME_STARTED_MESSAGE: &str = "Game started! The safe zone will begin shrinking soon.";
pub const ZONE_DAMAGE_MESSAGE: &str = "You are taking damage from the zone!";

/// Who a notification is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    All,
    Player(PlayerId),
}

/// A notification produced by the simulation
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipient: Recipient,
    pub msg: ServerMsg,
}

/// The world plus everything needed to advance it deterministically
pub struct Simulation {
    pub(super) world: World,
    pub(super) rng: Box<dyn RandomSource>,
    pub(super) movement: Box<dyn MovementPolicy>,
    spawner: PowerUpSpawner,
    tick: u64,
    pub(super) start_announcement_in: Option<u32>,
    outbox: Vec<Outbound>,
}

impl Simulation {
    pub fn new(rng: Box<dyn RandomSource>, movement: Box<dyn MovementPolicy>) -> Self {
        Self {
            world: World::new(MapSize::DEFAULT),
            rng,
            movement,
            spawner: PowerUpSpawner::default(),
            tick: 0,
            start_announcement_in: None,
            outbox: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Ticks simulated so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn player_count(&self) -> usize {
        self.world.players.len()
    }

    /// Run one tick: zone, bullets, zone hazard, spawns, then a full snapshot
    pub fn step(&mut self, now_ms: u64) {
        self.tick += 1;
        self.run_start_announcement();

        for msg in self.world.zone.tick(now_ms, self.rng.as_mut()) {
            self.broadcast(msg);
        }

        for hit in CombatSystem::advance_bullets(&mut self.world) {
            if hit.target_killed {
                self.eliminate(hit.target_id, Some(hit.shooter_id));
            }
        }

        for hit in CombatSystem::apply_zone_hazard(&mut self.world) {
            self.send_to(
                hit.player_id,
                ServerMsg::ZoneDamage(ZoneDamage {
                    damage: hit.damage,
                    message: ZONE_DAMAGE_MESSAGE.to_string(),
                }),
            );
            if hit.killed {
                self.eliminate(hit.player_id, None);
            }
        }

        self.spawner.tick(&mut self.world, self.rng.as_mut());

        let snapshot = self.snapshot();
        self.broadcast(ServerMsg::GameState(Box::new(snapshot)));
    }

    fn run_start_announcement(&mut self) {
        let Some(remaining) = self.start_announcement_in else {
            return;
        };
        if remaining > 1 {
            self.start_announcement_in = Some(remaining - 1);
            return;
        }

        self.start_announcement_in = None;
        self.broadcast(ServerMsg::PhaseChange(PhaseChange {
            phase: 0,
            message: GAME_STARTED_MESSAGE.to_string(),
            next_circle_center: None,
            next_circle_radius: None,
        }));
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.world)
    }

    /// Take every notification produced since the last drain
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub(super) fn broadcast(&mut self, msg: ServerMsg) {
        self.outbox.push(Outbound {
            recipient: Recipient::All,
            msg,
        });
    }

    pub(super) fn send_to(&mut self, player_id: PlayerId, msg: ServerMsg) {
        self.outbox.push(Outbound {
            recipient: Recipient::Player(player_id),
            msg,
        });
    }
}
