//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::ws::protocol::ClientMsg;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Default move budget, above any display refresh rate a client animates at
pub const DEFAULT_INPUT_RATE_LIMIT: u32 = 600;

/// Per-connection inbound limiter.
///
/// Only `move` intents are throttled. A later move supersedes a dropped one,
/// while joins, shots and pickups are applied as they arrive.
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    move_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new(moves_per_second: u32) -> Self {
        Self {
            move_limiter: create_limiter(moves_per_second),
        }
    }

    /// Check if an inbound message is allowed (returns true if allowed)
    pub fn allows(&self, msg: &ClientMsg) -> bool {
        match msg {
            ClientMsg::Move(_) => self.move_limiter.check().is_ok(),
            ClientMsg::Join(_) | ClientMsg::Shoot(_) | ClientMsg::CollectPowerUp(_) => true,
        }
    }
}
