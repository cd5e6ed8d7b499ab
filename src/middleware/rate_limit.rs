use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    cache::keys,
    config::StoreFailurePolicy,
    error::AppError,
    store::{StoreError, StoreSlot},
    utils::client_address,
};

/// Fixed-window limit attached to one endpoint.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    pub endpoint: String,
    pub window: Duration,
    pub max_requests: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allow { count: u64 },
    Reject { count: u64 },
}

#[derive(Clone)]
pub struct RateLimiter {
    store: StoreSlot,
    rule: RateLimitRule,
    failure_policy: StoreFailurePolicy,
}

impl RateLimiter {
    pub fn new(store: StoreSlot, rule: RateLimitRule, failure_policy: StoreFailurePolicy) -> Self {
        Self {
            store,
            rule,
            failure_policy,
        }
    }

    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    /// Counts this request against the client's window and decides whether it
    /// may proceed. Rejected requests are counted as well.
    pub async fn check(&self, client_address: &str) -> Result<RateLimitDecision, AppError> {
        let key = keys::rate_limit_key(&self.rule.endpoint, client_address);

        // INCR and arm the window expiry in one step
        let counted = match self.store.get() {
            Ok(store) => store.incr_with_expiry(&key, self.rule.window).await,
            Err(err) => Err(err),
        };

        let count = match counted {
            Ok(count) => count,
            Err(StoreError::NotReady) => return Err(AppError::NotReady),
            // store down: fail open or closed as configured
            Err(err) => match self.failure_policy {
                StoreFailurePolicy::Open => {
                    tracing::warn!("Rate limit skipped for {}: {}", client_address, err);
                    return Ok(RateLimitDecision::Allow { count: 0 });
                }
                StoreFailurePolicy::Closed => return Err(AppError::StoreUnavailable(err)),
            },
        };

        // the (max_requests + 1)th request in a window is rejected
        if count > self.rule.max_requests {
            Ok(RateLimitDecision::Reject { count })
        } else {
            Ok(RateLimitDecision::Allow { count })
        }
    }
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_address(&req, state.config.trust_proxy_headers);

    match state.rate_limiter.check(&client).await {
        Ok(RateLimitDecision::Allow { count }) => {
            tracing::debug!("Request {} in window for {}", count, client);
            next.run(req).await
        }
        Ok(RateLimitDecision::Reject { count }) => AppError::RateLimitExceeded {
            count,
            limit: state.rate_limiter.rule().max_requests,
        }
        .into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn incr_with_expiry(&self, _key: &str, _window: Duration) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    fn rule() -> RateLimitRule {
        RateLimitRule {
            endpoint: "/fish/{species}".into(),
            window: Duration::from_secs(60),
            max_requests: 3,
        }
    }

    fn limiter(store: Arc<dyn KeyValueStore>, policy: StoreFailurePolicy) -> RateLimiter {
        RateLimiter::new(StoreSlot::with_store(store), rule(), policy)
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_after_max_requests_and_resets_after_window() {
        let limiter = limiter(Arc::new(MemoryStore::new()), StoreFailurePolicy::Closed);

        for expected in 1..=3 {
            assert_eq!(
                limiter.check("10.0.0.1").await.unwrap(),
                RateLimitDecision::Allow { count: expected }
            );
        }
        assert_eq!(
            limiter.check("10.0.0.1").await.unwrap(),
            RateLimitDecision::Reject { count: 4 }
        );
        // rejected requests still count
        assert_eq!(
            limiter.check("10.0.0.1").await.unwrap(),
            RateLimitDecision::Reject { count: 5 }
        );

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(
            limiter.check("10.0.0.1").await.unwrap(),
            RateLimitDecision::Allow { count: 1 }
        );
    }

    #[tokio::test]
    async fn clients_have_separate_counters() {
        let limiter = limiter(Arc::new(MemoryStore::new()), StoreFailurePolicy::Closed);
        for _ in 0..3 {
            limiter.check("10.0.0.1").await.unwrap();
        }
        assert_eq!(
            limiter.check("10.0.0.2").await.unwrap(),
            RateLimitDecision::Allow { count: 1 }
        );
    }

    #[tokio::test]
    async fn store_outage_follows_policy() {
        let open = limiter(Arc::new(DownStore), StoreFailurePolicy::Open);
        assert_eq!(
            open.check("10.0.0.1").await.unwrap(),
            RateLimitDecision::Allow { count: 0 }
        );

        let closed = limiter(Arc::new(DownStore), StoreFailurePolicy::Closed);
        assert!(matches!(
            closed.check("10.0.0.1").await,
            Err(AppError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn unready_store_is_not_ready_error() {
        let limiter = RateLimiter::new(StoreSlot::new(), rule(), StoreFailurePolicy::Open);
        assert!(matches!(limiter.check("10.0.0.1").await, Err(AppError::NotReady)));
    }
}
