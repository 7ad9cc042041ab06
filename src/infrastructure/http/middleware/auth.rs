use crate::application::services::idempotency::IdempotencyCache;
use crate::application::services::lock::DistributedLock;
use crate::application::services::token::TokenAuthenticator;
use crate::infrastructure::http::middleware::error::ApiError;
use crate::infrastructure::persistence::Database;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub authenticator: Arc<TokenAuthenticator>,
    pub lock: DistributedLock,
    pub results: IdempotencyCache,
    /// Lock lease and wait budget for deduplicated operations.
    pub dedup_window: Duration,
}

/// The verified subject of the current request, plus the refreshed token
/// that replaces the one it arrived with.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub subject_id: String,
    pub token: String,
}

/// Verify the bearer token, stash the subject for the handler, and attach a
/// freshly signed replacement to the response. Every successful pass through
/// here extends the session: tokens slide, they are not fixed at login.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;
    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    let subject_id = state.authenticator.verify(token)?;
    let refreshed = state.authenticator.sign(&subject_id)?;

    request.extensions_mut().insert(AuthenticatedUser {
        subject_id,
        token: refreshed.clone(),
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&refreshed) {
        response.headers_mut().insert(header::AUTHORIZATION, value);
    }
    Ok(response)
}
