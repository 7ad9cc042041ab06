use crate::domain::ports::key_value_store::KeyValueStore;
use crate::infrastructure::http::middleware::error::ApiResult;
use std::sync::Arc;
use std::time::Duration;

const STEP_FLOOR: Duration = Duration::from_millis(50);
const STEP_CEILING: Duration = Duration::from_millis(800);
const STEP_GROWTH: f64 = 1.2;

/// Named, time-bounded mutual-exclusion leases over the shared key-value
/// store. Possession is binary: the key exists or it does not. A holder that
/// crashes without releasing is covered by the lease expiry in the store.
#[derive(Clone)]
pub struct DistributedLock {
    store: Arc<dyn KeyValueStore>,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Try to take the lease on `name` for `lease`, probing the store until
    /// the cumulative wait reaches `max_wait`. Returns false when the budget
    /// is exhausted without acquisition; store errors propagate immediately
    /// and abort the retry loop.
    pub async fn acquire(&self, name: &str, lease: Duration, max_wait: Duration) -> ApiResult<bool> {
        for delay in wait_schedule(max_wait) {
            if self.store.set_if_absent(name, b"", lease).await? {
                return Ok(true);
            }
            tokio::time::sleep(delay).await;
        }
        Ok(false)
    }

    /// Drop the lease unconditionally. Callers treat a failure here as a
    /// degraded condition to log, not an error to surface: the lease TTL
    /// releases the lock on its own.
    pub async fn release(&self, name: &str) -> ApiResult<()> {
        self.store.delete(name).await
    }
}

/// Sleep durations between successive acquisition probes, summing exactly to
/// `max_wait`. Built ascending (geometric from 50ms by 1.2x up to an 800ms
/// ceiling, then 800ms pads, then the remainder) and returned reversed, so
/// the longest sleeps come first and the probe rate rises as the deadline
/// nears. The reversal matches the timing of the system this replaces; see
/// DESIGN.md before changing it.
pub fn wait_schedule(max_wait: Duration) -> Vec<Duration> {
    let mut steps = vec![Duration::ZERO];
    let mut total = Duration::ZERO;

    let mut step = STEP_FLOOR;
    while step < STEP_CEILING && total + step <= max_wait {
        steps.push(step);
        total += step;
        step = Duration::from_secs_f64(step.as_secs_f64() * STEP_GROWTH);
    }

    while total + STEP_CEILING < max_wait {
        steps.push(STEP_CEILING);
        total += STEP_CEILING;
    }

    let remainder = max_wait - total;
    if remainder > Duration::ZERO {
        steps.push(remainder);
    }

    steps.reverse();
    steps
}
