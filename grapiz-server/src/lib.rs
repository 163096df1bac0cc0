//! Grapiz Server - matchmaking and move relay
//!
//! This crate provides the online backend:
//! - WebSocket relay pairing players and forwarding their events
//! - Status and board geometry endpoints
//! - Optional static file serving for a web client

pub mod hub;
pub mod protocol;
pub mod relay;
mod routes;
mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use hub::HubHandle;
pub use protocol::{ClientEvent, ConnectionId, ServerEvent};
pub use relay::{Relay, RelayConfig, RelayError, RelayStats};
pub use state::ServerState;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory served at `/` when set
    pub static_dir: Option<String>,
    /// Clock given to both players when a match starts
    pub initial_clock_secs: u32,
    /// Fixed seed for session ids
    pub session_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            initial_clock_secs: grapiz_core::INITIAL_CLOCK_SECS,
            session_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            initial_clock_secs: self.initial_clock_secs,
            seed: self.session_seed,
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        // Relay
        .route("/ws", get(routes::ws::ws_handler))
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Board geometry
        .route("/api/board", get(routes::board::get_board))
        .with_state(state)
        .layer(CorsLayer::permissive());

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new(config.clone()));
    let router = create_router(state);

    tracing::info!("Grapiz relay starting on http://0.0.0.0:{}", config.port);
    tracing::info!("WebSocket endpoint: ws://0.0.0.0:{}/ws", config.port);
    if let Some(dir) = &config.static_dir {
        tracing::info!("Static files served from: {}", dir);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
