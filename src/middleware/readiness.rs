use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::AppError};

/// Rejects requests with 503 until the store connection is installed.
pub async fn readiness_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.store.is_ready() {
        return AppError::NotReady.into_response();
    }
    next.run(req).await
}
