//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::world::PlayerId;
use crate::game::{Intent, PlayerInput};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::ClientMsg;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    // The connection id doubles as the player id once the client joins
    let player_id = Uuid::new_v4();
    info!(player_id = %player_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let broadcast_rx = state.arena.subscribe();
    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    let input_tx = state.arena.input_tx.clone();

    // Registered before any client intent so replies to `join` have a route
    if input_tx
        .send(PlayerInput::new(player_id, Intent::Connect(direct_tx)))
        .await
        .is_err()
    {
        error!(player_id = %player_id, "Arena is not running");
        return;
    }

    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);

    run_session(
        player_id,
        ws_sink,
        ws_stream,
        input_tx,
        broadcast_rx,
        direct_rx,
        rate_limiter,
    )
    .await;

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: PlayerId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    input_tx: mpsc::Sender<PlayerInput>,
    mut broadcast_rx: broadcast::Receiver<Arc<str>>,
    mut direct_rx: mpsc::UnboundedReceiver<Arc<str>>,
    rate_limiter: ConnectionRateLimiter,
) {
    // Writer task: arena notifications -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            let payload = tokio::select! {
                biased;
                Some(payload) = direct_rx.recv() => payload,
                result = broadcast_rx.recv() => match result {
                    Ok(payload) => payload,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(player_id = %player_id, lagged_count = n, "Client lagged, skipping {} broadcasts", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(player_id = %player_id, "Broadcast channel closed");
                        break;
                    }
                },
            };

            if let Err(e) = ws_sink.send(Message::Text(payload.to_string())).await {
                debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        if !rate_limiter.allows(&msg) {
                            warn!(player_id = %player_id, "Rate limited move intent");
                            continue;
                        }

                        let input = PlayerInput::new(player_id, Intent::Client(msg));
                        if input_tx.send(input).await.is_err() {
                            debug!(player_id = %player_id, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // A closed connection counts as leaving
    let _ = input_tx
        .send(PlayerInput::new(player_id, Intent::Disconnect))
        .await;

    writer_handle.abort();
}
