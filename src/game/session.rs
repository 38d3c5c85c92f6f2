//! Player sessions: intents, elimination, winner detection, round reset

use tracing::{debug, info, warn};

use crate::util::geometry::Point;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::simulation::{Simulation, START_ANNOUNCEMENT_DELAY_TICKS};
use super::spawner::{random_point_in_zone, SPAWN_RADIUS_FRACTION};
use super::world::{Bullet, Player, PlayerColor, PlayerId, PowerUpId, PowerUpKind, MAX_HEALTH};

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const HEALTH_PICKUP: i32 = 25;
pub const AMMO_PICKUP: u32 = 15;

impl Simulation {
    /// Apply a client intent immediately
    pub fn handle_intent(&mut self, player_id: PlayerId, msg: ClientMsg) {
        match msg {
            ClientMsg::Join(name) => {
                self.join(player_id, name);
            }
            ClientMsg::Move(intent) => {
                self.move_player(player_id, Point::new(intent.x, intent.y));
            }
            ClientMsg::Shoot(intent) => {
                self.shoot(
                    player_id,
                    Point::new(intent.x, intent.y),
                    Point::new(intent.velocity_x, intent.velocity_y),
                );
            }
            ClientMsg::CollectPowerUp(power_up_id) => {
                self.collect_power_up(player_id, power_up_id);
            }
        }
    }

    /// Register a player and send them the current world, their id and the phase.
    /// Returns false if the id is already registered.
    pub fn join(&mut self, player_id: PlayerId, name: Option<String>) -> bool {
        if self.world.players.contains_key(&player_id) {
            warn!(player_id = %player_id, "Player already joined");
            return false;
        }

        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());
        let color = PlayerColor::for_index(self.world.players.len());
        let spawn = random_point_in_zone(&self.world, self.rng.as_mut(), SPAWN_RADIUS_FRACTION);

        info!(
            player_id = %player_id,
            name = %name,
            player_count = self.world.players.len() + 1,
            "Player joined"
        );
        self.world.add_player(Player::new(player_id, name, color, spawn));

        let snapshot = self.snapshot();
        let phase = self.world.zone.current_phase_change();
        self.send_to(player_id, ServerMsg::GameState(Box::new(snapshot)));
        self.send_to(player_id, ServerMsg::SelfId(player_id));
        self.send_to(player_id, ServerMsg::PhaseChange(phase));
        true
    }

    /// Overwrite the player's position, subject to the movement policy
    pub fn move_player(&mut self, player_id: PlayerId, requested: Point) {
        let Some(player) = self.world.players.get_mut(&player_id) else {
            return;
        };
        let position = self.movement.resolve(player.position(), requested);
        player.set_position(position);
    }

    /// Spend one round of ammo on a bullet. Returns false when nothing was fired.
    pub fn shoot(&mut self, player_id: PlayerId, origin: Point, velocity: Point) -> bool {
        let Some(player) = self.world.players.get_mut(&player_id) else {
            return false;
        };
        if player.ammo == 0 {
            debug!(player_id = %player_id, "Shot ignored, out of ammo");
            return false;
        }

        player.ammo -= 1;
        self.world.add_bullet(Bullet::new(player_id, origin, velocity));
        true
    }

    /// Apply and consume a power-up. Stale ids are ignored.
    pub fn collect_power_up(&mut self, player_id: PlayerId, power_up_id: PowerUpId) -> Option<PowerUpKind> {
        if !self.world.players.contains_key(&player_id) {
            return None;
        }
        let Some(power_up) = self.world.take_power_up(power_up_id) else {
            debug!(player_id = %player_id, power_up_id, "Power-up already gone");
            return None;
        };

        let player = self.world.players.get_mut(&player_id)?;
        match power_up.kind {
            PowerUpKind::Health => player.health = (player.health + HEALTH_PICKUP).min(MAX_HEALTH),
            PowerUpKind::Ammo => player.ammo = player.ammo.saturating_add(AMMO_PICKUP),
        }
        debug!(player_id = %player_id, power_up_id, kind = ?power_up.kind, "Power-up collected");
        Some(power_up.kind)
    }

    /// Connection dropped
    pub fn handle_disconnect(&mut self, player_id: PlayerId) {
        if self.world.remove_player(&player_id).is_some() {
            info!(player_id = %player_id, "Player left");
            self.check_for_winner();
        }
    }

    /// Remove a player whose health reached zero, crediting `killer` if any
    pub(super) fn eliminate(&mut self, player_id: PlayerId, killer: Option<PlayerId>) {
        // A reset earlier this tick may already have restored or removed them
        if !self.world.player(&player_id).is_some_and(Player::is_dead) {
            return;
        }

        self.send_to(player_id, ServerMsg::Dead);

        if let Some(shooter) = killer {
            if let Some(shooter) = self.world.player_mut(&shooter) {
                shooter.score += 1;
            }
        }

        self.world.remove_player(&player_id);
        info!(
            player_id = %player_id,
            killer = ?killer,
            remaining = self.world.players.len(),
            "Player eliminated"
        );

        self.check_for_winner();
    }

    fn check_for_winner(&mut self) {
        if self.world.players.len() != 1 {
            return;
        }
        let Some(winner) = self.world.players.keys().next().copied() else {
            return;
        };

        info!(player_id = %winner, "Round won");
        self.send_to(winner, ServerMsg::Winner);
        self.reset_game();
    }

    /// Start a new round with the remaining players
    pub fn reset_game(&mut self) {
        self.world.zone.reset();
        self.world.clear_items();

        let ids: Vec<PlayerId> = self.world.players.keys().copied().collect();
        for id in ids {
            let spawn = random_point_in_zone(&self.world, self.rng.as_mut(), SPAWN_RADIUS_FRACTION);
            if let Some(player) = self.world.player_mut(&id) {
                player.respawn(spawn);
            }
        }

        self.broadcast(ServerMsg::GameReset);
        self.start_announcement_in = Some(START_ANNOUNCEMENT_DELAY_TICKS);
        info!(players = self.world.players.len(), "Game reset");
    }
}
