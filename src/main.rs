//! Zone Royale Server - authoritative battle-royale arena
//!
//! Entry point. It handles:
//! - WebSocket connections for real-time play
//! - The fixed-rate simulation task that owns the world
//! - Static files for the browser client

mod app;
mod config;
mod game;
mod http;
mod util;
mod ws;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;
use crate::game::movement::policy_for;
use crate::game::random::world_rng;
use crate::game::{Arena, Simulation};
use crate::http::{bind_with_retry, build_router};
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Zone Royale Server");
    if let Some(seed) = config.rng_seed {
        info!(seed, "Using fixed world seed");
    }
    if let Some(max_distance) = config.max_move_distance {
        info!(max_distance, "Clamping player movement");
    }

    // The arena task owns the world; everything else talks to it through the handle
    let simulation = Simulation::new(
        Box::new(world_rng(config.rng_seed)),
        policy_for(config.max_move_distance),
    );
    let (arena, arena_handle) = Arena::new(simulation);
    tokio::spawn(arena.run());

    let listener = bind_with_retry(&config.host, config.port, config.port_retry_limit).await?;
    let addr = listener.local_addr()?;

    let router = build_router(AppState::new(config, arena_handle));

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
