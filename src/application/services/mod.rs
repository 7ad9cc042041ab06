pub mod auth;
pub mod idempotency;
pub mod lock;
pub mod token;
