//! Status endpoint

use crate::ServerState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: &'static str,
    pub connections: usize,
    pub waiting: usize,
    pub sessions: usize,
}

pub async fn status_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let stats = state.hub.stats().await.map_err(|err| {
        tracing::error!("status unavailable: {}", err);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        engine: "rust",
        connections: stats.connections,
        waiting: stats.waiting,
        sessions: stats.sessions,
    }))
}
