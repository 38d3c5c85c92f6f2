//! HTTP surface

pub mod listener;
pub mod routes;

pub use listener::bind_with_retry;
pub use routes::build_router;
