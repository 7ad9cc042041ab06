use crate::application::services::idempotency::IdempotencyCache;
use crate::application::services::lock::DistributedLock;
use crate::application::services::token::{TokenAuthenticator, TokenKeys};
use crate::config::Config;
use crate::domain::ports::key_value_store::KeyValueStore;
use crate::infrastructure::http::middleware::auth::AppState;
use crate::infrastructure::persistence::memory_store::InMemoryKeyValueStore;
use crate::infrastructure::persistence::redis_store::RedisKeyValueStore;
use crate::infrastructure::persistence::Database;
use std::sync::Arc;
use std::time::Duration;

/// Assemble the application state from configuration. Everything the
/// request path needs is constructed once here and owned by `AppState`;
/// nothing lives in process-global variables.
pub async fn build_app_state(db: Database, config: &Config) -> anyhow::Result<AppState> {
    let current_pem = std::fs::read_to_string(&config.jwt_key_path)?;
    let previous_pem = match &config.jwt_previous_key_path {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let keys = TokenKeys::from_private_pems(&current_pem, previous_pem.as_deref())?;
    let authenticator = Arc::new(TokenAuthenticator::new(
        keys,
        chrono::Duration::minutes(config.token_lifetime_minutes),
    ));
    tracing::info!(
        previous_key = previous_pem.is_some(),
        "token authenticator initialized"
    );

    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisKeyValueStore::connect(url).await?;
            tracing::info!("connected to redis key-value store");
            Arc::new(store)
        }
        None => {
            tracing::warn!(
                "REDIS_URL not set; using the in-process key-value store, \
                 which cannot coordinate across server instances"
            );
            Arc::new(InMemoryKeyValueStore::new())
        }
    };

    let lock = DistributedLock::new(store.clone());
    let results = IdempotencyCache::new(
        store,
        Duration::from_secs(config.dedup_result_ttl_secs),
    );

    Ok(AppState {
        db,
        authenticator,
        lock,
        results,
        dedup_window: Duration::from_secs(config.dedup_window_secs),
    })
}
