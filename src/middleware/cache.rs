use axum::{
    Json,
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    cache::{CacheError, SpeciesCacheOperations},
    error::AppError,
    routes::fish::model::{SpeciesKey, SpeciesResponse},
};

/// Answers from the cache when an entry exists; otherwise hands the request on.
pub async fn cache_gate(
    State(state): State<AppState>,
    Path(species): Path<String>,
    req: Request,
    next: Next,
) -> Response {
    let Some(species) = SpeciesKey::parse(species) else {
        return next.run(req).await;
    };

    let store = match state.store.get() {
        Ok(store) => store,
        Err(err) => return AppError::CacheLookup(CacheError::Store(err)).into_response(),
    };

    match SpeciesCacheOperations::get_cached_species(&store, species.as_str()).await {
        Ok(Some(data)) => {
            tracing::debug!("Cache hit for species {}", species);
            Json(SpeciesResponse::cached(data)).into_response()
        }
        Ok(None) => next.run(req).await,
        Err(err) => AppError::CacheLookup(err).into_response(),
    }
}
