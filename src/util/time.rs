//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Simulation ticks per second
pub const TICK_RATE: u32 = 60;

/// Wall-clock duration of one tick
pub fn tick_duration() -> Duration {
    Duration::from_micros(1_000_000 / TICK_RATE as u64)
}

/// Convert whole seconds into ticks at the simulation rate
pub const fn secs_to_ticks(secs: u32) -> u32 {
    secs * TICK_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_ticks() {
        assert_eq!(secs_to_ticks(0), 0);
        assert_eq!(secs_to_ticks(45), 2700);
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(), Duration::from_micros(16_666));
    }
}
