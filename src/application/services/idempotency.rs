use crate::domain::ports::key_value_store::KeyValueStore;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One completed request outcome, stored under a request fingerprint so a
/// duplicate submission replays it instead of executing again. Handler
/// errors are flattened to their message: arbitrary error types cannot be
/// round-tripped through the store, the (status, message) pair can.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub status_code: u16,
    pub err_message: Option<String>,
    pub output: serde_json::Value,
}

/// Short-lived store of one `CachedResult` per fingerprint. Entries are
/// written once per execution and expire on their own; duplicates arriving
/// after expiry simply execute again.
#[derive(Clone)]
pub struct IdempotencyCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl IdempotencyCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// A miss means no identical request completed within the TTL window.
    pub async fn lookup(&self, result_key: &str) -> ApiResult<Option<CachedResult>> {
        let Some(bytes) = self.store.get(result_key).await? else {
            return Ok(None);
        };
        let cached = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Internal(format!("corrupt idempotency cache entry: {}", e))
        })?;
        Ok(Some(cached))
    }

    pub async fn store(&self, result_key: &str, result: &CachedResult) -> ApiResult<()> {
        let bytes = serde_json::to_vec(result).map_err(|e| {
            ApiError::Internal(format!("failed to encode idempotency cache entry: {}", e))
        })?;
        self.store.set(result_key, &bytes, self.ttl).await
    }
}
