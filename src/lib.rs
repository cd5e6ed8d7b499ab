use std::sync::Arc;

use config::Config;
use middleware::{RateLimitRule, RateLimiter};
use store::StoreSlot;
use upstream::SpeciesSource;

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod store;
pub mod upstream;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreSlot,
    pub upstream: Arc<dyn SpeciesSource>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, store: StoreSlot, upstream: Arc<dyn SpeciesSource>) -> Self {
        let rule = RateLimitRule {
            endpoint: router::FISH_ROUTE.to_string(),
            window: config.rate_limit_window(),
            max_requests: config.rate_limit_requests,
        };
        let rate_limiter = Arc::new(RateLimiter::new(
            store.clone(),
            rule,
            config.store_failure_policy,
        ));

        Self {
            config: Arc::new(config),
            store,
            upstream,
            rate_limiter,
        }
    }
}
