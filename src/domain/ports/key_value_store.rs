use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;
use std::time::Duration;

/// Contract over the shared key-value store used for distributed locks and
/// the idempotency cache. Every coordination primitive in the system goes
/// through this port, never through in-process locks, because multiple
/// server processes may run against the same store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically create the key with the given expiry. Returns true if the
    /// key was created, false if it already exists (and has not expired).
    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<bool>;

    /// Unconditional write with expiry; the last write for a key wins.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> ApiResult<()>;

    /// Fetch the value for a key, or None if absent or expired.
    async fn get(&self, key: &str) -> ApiResult<Option<Vec<u8>>>;

    /// Remove the key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> ApiResult<()>;
}
