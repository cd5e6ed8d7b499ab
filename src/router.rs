use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};

use crate::{
    AppState,
    middleware::{cache_gate, log_errors, rate_limit, readiness_gate},
    routes,
};

pub const FISH_ROUTE: &str = "/fish/{species}";

// Layers run outermost-last: readiness, then the rate limiter, then the cache
// gate, then the handler.
pub fn fish_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(FISH_ROUTE, get(routes::fish::get_species))
        .route_layer(from_fn_with_state(state.clone(), cache_gate))
        .route_layer(from_fn_with_state(state.clone(), rate_limit))
        .route_layer(from_fn_with_state(state, readiness_gate))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(routes::health::ping))
        .merge(fish_routes(state.clone()))
        .layer(from_fn(log_errors))
        .with_state(state)
}
