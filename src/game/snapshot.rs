//! Snapshot building for network transmission

use crate::ws::protocol::GameSnapshot;

use super::world::World;

impl GameSnapshot {
    /// Complete copy of the world as clients see it
    pub fn capture(world: &World) -> Self {
        let zone = &world.zone;
        let next_circle = zone.next_circle();

        Self {
            players: world.players.clone(),
            bullets: world.bullets.clone(),
            power_ups: world.power_ups.clone(),
            map_radius: zone.radius(),
            map_size: zone.map_size(),
            shrink_phase: zone.phase(),
            next_phase_in: zone.next_phase_in(),
            next_circle_center: next_circle.map(|c| c.center),
            next_circle_radius: next_circle.map(|c| c.radius),
            current_circle_center: zone.center(),
        }
    }
}

/// Running totals of outbound snapshot sizes
#[derive(Debug, Default)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_players_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, player_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_players_per_snapshot =
            self.avg_players_per_snapshot * ((n - 1.0) / n) + (player_count as f32 / n);
    }

    pub fn avg_bytes(&self) -> u64 {
        self.total_bytes.checked_div(self.total_snapshots).unwrap_or(0)
    }
}
