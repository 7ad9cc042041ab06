use crate::application::services::idempotency::{CachedResult, IdempotencyCache};
use crate::application::services::lock::DistributedLock;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::http::pipeline::{Reply, RequestContext, TxHandler};
use crate::infrastructure::persistence::UnitOfWork;
use async_trait::async_trait;
use axum::http::StatusCode;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// How a request fingerprint is derived. Create-style operations include a
/// digest of the body, so two creates that differ only in payload run
/// independently. Delete-style operations have no meaningful body; all
/// deletes of one resource by one subject collapse onto a single
/// fingerprint, which is safe because deletion is idempotent at the
/// resource level.
enum FingerprintMode {
    BodyDigest,
    PathOnly,
}

/// Wraps a transactional handler with at-most-once semantics per request
/// fingerprint: a store-backed mutex serializes duplicates, and a cached
/// outcome replays for every duplicate that arrives inside the result TTL.
pub struct Deduplicate<H> {
    inner: H,
    lock: DistributedLock,
    results: IdempotencyCache,
    /// Lock lease and wait budget: the maximum time one execution may hold
    /// out a duplicate.
    window: Duration,
    mode: FingerprintMode,
}

impl<H> Deduplicate<H> {
    pub fn for_create(
        inner: H,
        lock: DistributedLock,
        results: IdempotencyCache,
        window: Duration,
    ) -> Self {
        Self {
            inner,
            lock,
            results,
            window,
            mode: FingerprintMode::BodyDigest,
        }
    }

    pub fn for_delete(
        inner: H,
        lock: DistributedLock,
        results: IdempotencyCache,
        window: Duration,
    ) -> Self {
        Self {
            inner,
            lock,
            results,
            window,
            mode: FingerprintMode::PathOnly,
        }
    }

    fn fingerprint(&self, ctx: &RequestContext, body: &[u8]) -> String {
        match self.mode {
            FingerprintMode::BodyDigest => {
                let digest = hex::encode(Sha256::digest(body));
                format!(
                    "{}-{}-{}-{}",
                    ctx.subject_id, ctx.path, ctx.method, digest
                )
            }
            FingerprintMode::PathOnly => {
                format!("{}-{}-{}", ctx.subject_id, ctx.path, ctx.method)
            }
        }
    }
}

#[async_trait]
impl<H: TxHandler> TxHandler for Deduplicate<H> {
    async fn handle(
        &self,
        body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply> {
        let fingerprint = self.fingerprint(ctx, body);
        let lock_name = format!("{}-LOCK", fingerprint);
        let result_key = format!("{}-RESULT", fingerprint);

        // Store errors abort here as internal failures; running out of the
        // wait budget means a duplicate is still executing, which is the
        // client's conflict to retry, not ours.
        if !self.lock.acquire(&lock_name, self.window, self.window).await? {
            return Err(ApiError::Conflict(
                "a duplicate request is already being processed".to_string(),
            ));
        }

        let outcome = self.run_locked(&result_key, body, ctx, uow).await;

        if let Err(err) = self.lock.release(&lock_name).await {
            tracing::warn!(lock = %lock_name, error = %err, "failed to release deduplication lock");
        }

        outcome
    }
}

impl<H: TxHandler> Deduplicate<H> {
    /// The critical section. The cache check happens while the lock is
    /// held, which is what makes check-then-act race-free: a duplicate
    /// cannot slip between the lookup and the execution.
    async fn run_locked(
        &self,
        result_key: &str,
        body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply> {
        if let Some(cached) = self.results.lookup(result_key).await? {
            return replay(cached);
        }

        let outcome = self.inner.handle(body, ctx, uow).await;

        // Success and failure are both recorded, so a retry of a failed
        // submission replays the failure instead of executing again.
        let record = match &outcome {
            Ok(reply) => CachedResult {
                status_code: reply.status.as_u16(),
                err_message: None,
                output: reply.body.clone(),
            },
            Err(err) => CachedResult {
                status_code: err.status_code().as_u16(),
                err_message: Some(err.message().to_string()),
                output: serde_json::Value::Null,
            },
        };
        self.results.store(result_key, &record).await?;

        outcome
    }
}

fn replay(cached: CachedResult) -> ApiResult<Reply> {
    let status = StatusCode::from_u16(cached.status_code)
        .map_err(|_| ApiError::Internal("corrupt idempotency cache entry".to_string()))?;
    match cached.err_message {
        Some(message) => Err(ApiError::from_status(status, message)),
        None => Ok(Reply::with_status(status, cached.output)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_reconstructs_success_and_failure() {
        let ok = replay(CachedResult {
            status_code: 200,
            err_message: None,
            output: serde_json::json!({"id": "c1"}),
        })
        .unwrap();
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body, serde_json::json!({"id": "c1"}));

        let err = replay(CachedResult {
            status_code: 404,
            err_message: Some("the record is not found".to_string()),
            output: serde_json::Value::Null,
        })
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::NotFound("the record is not found".to_string())
        );
    }
}
