use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::cache::keys;
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cached value is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to serialize value for cache: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Species cache operations
pub struct SpeciesCacheOperations;

impl SpeciesCacheOperations {
    /// Looks up the cached upstream body for a species.
    pub async fn get_cached_species(
        store: &Arc<dyn KeyValueStore>,
        species: &str,
    ) -> Result<Option<Value>, CacheError> {
        let key = keys::species_key(species);
        match store.get(&key).await? {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(CacheError::Decode)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Caches the upstream body unless another request already did.
    ///
    /// Returns `false` when an existing entry was left in place.
    pub async fn cache_species(
        store: &Arc<dyn KeyValueStore>,
        species: &str,
        data: &Value,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let key = keys::species_key(species);
        let json = serde_json::to_string(data).map_err(CacheError::Encode)?;
        Ok(store.set_if_absent(&key, &json, ttl).await?)
    }
}
