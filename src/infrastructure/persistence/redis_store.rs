use crate::domain::ports::key_value_store::KeyValueStore;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed key-value store. The lock relies on `SET ... NX PX` being a
/// single atomic command on the server; expiry is enforced by Redis itself.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn: ConnectionManager,
}

impl RedisKeyValueStore {
    pub async fn connect(url: &str) -> ApiResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ApiError::Internal(format!("invalid redis url: {}", e)))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ApiError::Internal(format!("failed to connect to redis: {}", e)))?;
        Ok(Self { conn })
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    // Redis rejects PX 0; clamp to the smallest expirable unit.
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| ApiError::Internal(format!("redis SET NX failed: {}", e)))?;
        Ok(reply.is_some())
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| ApiError::Internal(format!("redis SET failed: {}", e)))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ApiResult<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| ApiError::Internal(format!("redis GET failed: {}", e)))
    }

    async fn delete(&self, key: &str) -> ApiResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| ApiError::Internal(format!("redis DEL failed: {}", e)))?;
        Ok(())
    }
}
