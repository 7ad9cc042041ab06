use catnap::application::services::idempotency::IdempotencyCache;
use catnap::application::services::lock::DistributedLock;
use catnap::application::services::token::{TokenAuthenticator, TokenKeys};
use catnap::domain::ports::key_value_store::KeyValueStore;
use catnap::infrastructure::http::middleware::auth::AppState;
use catnap::infrastructure::persistence::memory_store::InMemoryKeyValueStore;
use catnap::Database;
use std::sync::Arc;
use std::time::Duration;

const CURRENT_PEM: &str = include_str!("../fixtures/current.pem");
const PREVIOUS_PEM: &str = include_str!("../fixtures/previous.pem");

/// Application state over the in-process store and the fixture signing
/// keys, mirroring what bootstrap assembles in production.
pub fn test_state(db: Database, result_ttl: Duration) -> AppState {
    let keys = TokenKeys::from_private_pems(CURRENT_PEM, Some(PREVIOUS_PEM)).unwrap();
    let authenticator = Arc::new(TokenAuthenticator::new(
        keys,
        chrono::Duration::minutes(30),
    ));
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
    AppState {
        db,
        authenticator,
        lock: DistributedLock::new(store.clone()),
        results: IdempotencyCache::new(store, result_ttl),
        dedup_window: Duration::from_secs(5),
    }
}
