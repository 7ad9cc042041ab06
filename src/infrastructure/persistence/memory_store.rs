use crate::domain::ports::key_value_store::KeyValueStore;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Single-process key-value store backed by a `DashMap`, used when no
/// `REDIS_URL` is configured and in tests. Expiry is enforced lazily: an
/// expired entry is treated as absent and evicted when next touched.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: DashMap<String, StoredValue>,
}

struct StoredValue {
    data: Vec<u8>,
    expires_at: Instant,
}

impl StoredValue {
    fn new(data: &[u8], ttl: Duration) -> Self {
        Self {
            data: data.to_vec(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<bool> {
        // The entry guard holds the shard lock, which makes the
        // check-then-insert atomic per key.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(StoredValue::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value, ttl));
                Ok(true)
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<()> {
        self.entries
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> ApiResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.data.clone()));
            }
        } else {
            return Ok(None);
        }
        // Expired: evict outside the read guard.
        self.entries.remove(key);
        Ok(None)
    }

    async fn delete(&self, key: &str) -> ApiResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
