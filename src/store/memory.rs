use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Counter(u64),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Minimum time between sweeps of expired keys.
const PURGE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    last_purge: Instant,
}

impl Entries {
    /// Drops expired keys, at most once per `PURGE_INTERVAL`. Called on writes
    /// so keys that are never read again do not pile up.
    fn purge_expired(&mut self, now: Instant) {
        if now.duration_since(self.last_purge) < PURGE_INTERVAL {
            return;
        }
        let before = self.map.len();
        self.map.retain(|_, e| e.is_live(now));
        self.last_purge = now;

        let purged = before - self.map.len();
        if purged > 0 {
            tracing::trace!("Purged {} expired keys", purged);
        }
    }
}

/// In-process store with the same expiry semantics as the Redis one.
///
/// Uses tokio's clock so tests can pause and advance time.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                last_purge: Instant::now(),
            }),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().map.values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut guard = self.entries.lock();
        let entries = &mut guard.map;

        let value = entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| match &entry.value {
                Value::Text(text) => text.clone(),
                Value::Counter(count) => count.to_string(),
            });
        if value.is_none() {
            entries.remove(key);
        }
        Ok(value)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut guard = self.entries.lock();
        guard.purge_expired(now);
        let entries = &mut guard.map;

        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut guard = self.entries.lock();
        guard.purge_expired(now);

        let entry = guard
            .map
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live(now) {
                    e.value = Value::Counter(0);
                    e.expires_at = None;
                }
            })
            .or_insert(Entry {
                value: Value::Counter(0),
                expires_at: None,
            });

        let count = match entry.value {
            Value::Counter(count) => count + 1,
            Value::Text(ref text) => {
                let current: u64 = text.parse().map_err(|_| {
                    StoreError::Unavailable(format!("value at {key} is not an integer"))
                })?;
                current + 1
            }
        };
        entry.value = Value::Counter(count);
        if entry.expires_at.is_none() {
            entry.expires_at = Some(now + window);
        }
        Ok(count)
    }
}
