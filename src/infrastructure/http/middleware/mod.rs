pub mod auth;
pub mod dedup;
pub mod error;

pub use auth::{require_auth, AppState, AuthenticatedUser};
pub use dedup::Deduplicate;
pub use error::{ApiError, ApiResult};
