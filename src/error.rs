use axum::Json;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::store::StoreError;
use crate::upstream::FetchError;

pub const RATE_LIMIT_MESSAGE: &str = "too much requests";
pub const DATA_UNAVAILABLE: &str = "Data unavailable";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("rate limit exceeded: {count} requests, limit {limit}")]
    RateLimitExceeded { count: u64, limit: u64 },

    #[error("cache lookup failed: {0}")]
    CacheLookup(#[source] CacheError),

    #[error("cache population failed: {0}")]
    CachePopulate(#[source] CacheError),

    #[error(transparent)]
    UpstreamFetch(#[from] FetchError),

    #[error("invalid species key")]
    InvalidSpecies,

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("service not ready")]
    NotReady,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateLimitExceeded { count, limit } => {
                tracing::debug!("Rejected request {} over limit {}", count, limit);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    MessageResponse::new(RATE_LIMIT_MESSAGE),
                )
                    .into_response()
            }
            AppError::CacheLookup(err) => {
                tracing::error!("Cache lookup failed: {}", err);
                StatusCode::NOT_FOUND.into_response()
            }
            err @ (AppError::CachePopulate(_)
            | AppError::UpstreamFetch(_)
            | AppError::InvalidSpecies) => {
                tracing::error!("Species request failed: {}", err);
                (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    DATA_UNAVAILABLE,
                )
                    .into_response()
            }
            AppError::StoreUnavailable(err) => {
                tracing::error!("Key-value store unavailable: {}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    MessageResponse::new("store unavailable"),
                )
                    .into_response()
            }
            AppError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                MessageResponse::new("service not ready"),
            )
                .into_response(),
        }
    }
}
