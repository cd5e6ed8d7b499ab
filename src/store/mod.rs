//! Key-value store shared by the species cache and the rate limiter.
//!
//! The store owns every cache entry and rate counter along with their expiry;
//! the application never keeps a copy past a single request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not initialized yet")]
    NotReady,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// `GET key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `SET key value EX ttl NX`. Returns whether the value was written.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;

    /// Increments the counter at `key` and, when the counter has no expiry
    /// yet, expires it after `window`. Both steps happen atomically.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, StoreError>;
}

/// Process-wide handle to the connected store.
///
/// Empty until startup finishes connecting; readers get
/// [`StoreError::NotReady`] until then.
#[derive(Clone, Default)]
pub struct StoreSlot {
    inner: Arc<OnceCell<Arc<dyn KeyValueStore>>>,
}

impl StoreSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        let slot = Self::new();
        slot.install(store);
        slot
    }

    /// Installs the connected store. Only the first call has any effect.
    pub fn install(&self, store: Arc<dyn KeyValueStore>) -> bool {
        self.inner.set(store).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.initialized()
    }

    pub fn get(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        self.inner.get().cloned().ok_or(StoreError::NotReady)
    }
}
