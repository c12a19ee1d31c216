//! Connection handlers for the Courier server.
//!
//! This module handles the HTTP surface, the WebSocket upgrade, and the
//! per-connection event loop.

use crate::config::Config;
use crate::metrics::{self, ConnectionMetricsGuard};
use crate::origin::OriginPolicy;
use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use courier_core::{
    connection::next_connection_id, ConnectionHandle, EventOutcome, PresenceRegistry, Session,
};
use courier_protocol::{codec, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Shared server state.
pub struct AppState {
    /// The presence registry.
    pub registry: Arc<PresenceRegistry>,
    /// Compiled cross-origin policy.
    pub origins: OriginPolicy,
    /// Server configuration.
    pub config: Config,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            registry: Arc::new(PresenceRegistry::new()),
            origins: OriginPolicy::new(&config.allowed_origins),
            config,
        }
    }
}

/// Run the HTTP/WebSocket server.
///
/// # Errors
///
/// Returns an error if the server fails to start. Bind failure is fatal;
/// there is no retry.
pub async fn run_server(config: Config) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone()));

    // Start metrics server if enabled
    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            error!("Failed to start metrics server: {}", e);
        }
    }

    // Build router
    let app = Router::new()
        .route(&config.websocket_path, get(ws_handler))
        .route("/ping", get(ping_handler))
        .with_state(state);

    // Bind and serve
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Courier server listening on {}", addr);
    info!(
        "WebSocket endpoint: ws://{}{}",
        addr, config.websocket_path
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler.
async fn ping_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "msg": "Ping Successful",
        "online": state.registry.online_count(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// WebSocket upgrade handler.
///
/// Rejects upgrades from web origins outside the configured allow-list.
async fn ws_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.origins.allows(origin) {
        warn!(origin = ?origin, "Rejected WebSocket upgrade: origin not allowed");
        metrics::record_error("origin");
        return StatusCode::FORBIDDEN.into_response();
    }

    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    // Record connection metrics
    let _metrics_guard = ConnectionMetricsGuard::new();

    let connection_id = next_connection_id();
    debug!(connection = connection_id, "WebSocket connected");

    // Per-connection outbound queue; relays are queued here fire-and-forget
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(state.config.outbound_queue);
    let handle = ConnectionHandle::new(connection_id, out_tx);
    let mut session = Session::new(state.registry.clone(), handle);

    // Split the WebSocket
    let (mut sender, mut receiver) = socket.split();

    // Event loop
    loop {
        tokio::select! {
            // Deliver queued outbound events
            Some(event) = out_rx.recv() => {
                match codec::encode_server(&event) {
                    Ok(text) => {
                        if sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(connection = connection_id, error = %e, "Encode error");
                        metrics::record_error("encode");
                    }
                }
            }

            // Receive from WebSocket
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match codec::decode_client(&text) {
                            Ok(event) => {
                                metrics::record_event(event.name());
                                match session.handle_event(event) {
                                    EventOutcome::Registered => {
                                        metrics::set_registered_users(state.registry.online_count());
                                    }
                                    EventOutcome::Relayed { delivered } => {
                                        metrics::record_relay(delivered);
                                    }
                                    EventOutcome::Ignored => {}
                                }
                            }
                            Err(e) => {
                                // Malformed events are dropped, not reported
                                debug!(connection = connection_id, error = %e, "Ignoring malformed event");
                                metrics::record_error("decode");
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        debug!(connection = connection_id, "Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        // Ignore pongs
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(connection = connection_id, "Received close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(connection = connection_id, error = %e, "WebSocket error");
                        metrics::record_error("websocket");
                        break;
                    }
                    None => {
                        debug!(connection = connection_id, "WebSocket stream ended");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup: remove any presence entry for this connection
    session.disconnect();
    metrics::set_registered_users(state.registry.online_count());

    debug!(connection = connection_id, "WebSocket disconnected");
}
