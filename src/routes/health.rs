use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

/// Ping response
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub ready: bool,
    /// Server time, unix seconds
    pub timestamp: i64,
}

/// Health check; reports whether the store is connected.
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    let ready = state.store.is_ready();
    Json(PingResponse {
        status: if ready { "ok" } else { "starting" },
        ready,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
