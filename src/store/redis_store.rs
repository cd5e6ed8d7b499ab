use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script, aio::MultiplexedConnection};

use super::{KeyValueStore, StoreError};

/// INCR plus EXPIRE in one round trip. A counter without a TTL (left behind by
/// a crash between the two commands in older deployments) is re-armed too.
const INCR_WITH_EXPIRY: &str = r#"
local count = redis.call('INCR', KEYS[1])
if redis.call('TTL', KEYS[1]) == -1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Redis-backed store sharing one multiplexed connection across requests.
pub struct RedisStore {
    conn: MultiplexedConnection,
    incr_script: Script,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = RedisClient::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("Redis answered {}", pong);

        Ok(Self {
            conn,
            incr_script: Script::new(INCR_WITH_EXPIRY),
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // SET ... NX replies OK when written and nil when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let count: u64 = self
            .incr_script
            .key(key)
            .arg(window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;
        Ok(count)
    }
}
