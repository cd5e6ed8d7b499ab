use axum::extract::{Json, Path, State};

use crate::{
    AppState,
    cache::{CacheError, SpeciesCacheOperations},
    error::AppError,
    upstream::{FetchError, is_empty_result},
};

use super::model::{SpeciesKey, SpeciesResponse};

/// Cache-miss path: fetch upstream, populate the cache, respond.
#[axum::debug_handler]
pub async fn get_species(
    State(state): State<AppState>,
    Path(species): Path<String>,
) -> Result<Json<SpeciesResponse>, AppError> {
    let species = SpeciesKey::parse(species).ok_or(AppError::InvalidSpecies)?;

    let data = state.upstream.fetch(species.as_str()).await?;
    if is_empty_result(&data) {
        return Err(FetchError::EmptyResult.into());
    }

    let store = state
        .store
        .get()
        .map_err(|e| AppError::CachePopulate(CacheError::Store(e)))?;
    let stored = SpeciesCacheOperations::cache_species(
        &store,
        species.as_str(),
        &data,
        state.config.cache_ttl(),
    )
    .await
    .map_err(AppError::CachePopulate)?;

    if !stored {
        tracing::debug!("Species {} already cached by a concurrent request", species);
    }

    Ok(Json(SpeciesResponse::fresh(data)))
}
