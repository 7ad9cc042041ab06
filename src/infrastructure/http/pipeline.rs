use crate::infrastructure::http::middleware::auth::{AppState, AuthenticatedUser};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{Database, UnitOfWork};
use async_trait::async_trait;
use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;

/// Request bodies are buffered in full before dispatch, both to hash them
/// for deduplication and to hand the handler a replayable slice.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// What a handler needs to know about the request it serves, independent of
/// the HTTP framework: the route identity (method + path), the bound path
/// parameters, and the authenticated subject.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub params: HashMap<String, String>,
    pub subject_id: String,
}

impl RequestContext {
    /// Path parameter by name; missing bindings are a routing bug surfaced
    /// as a bad request rather than a panic.
    pub fn param(&self, name: &str) -> ApiResult<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::BadRequest(format!("missing path parameter: {}", name)))
    }
}

/// A handler's successful outcome: status plus JSON body.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn with_status(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Business handler running inside a unit of work. The pipeline owns the
/// scope: it commits when the handler returns Ok and rolls back otherwise,
/// so handlers never touch commit/rollback themselves.
#[async_trait]
pub trait TxHandler: Send + Sync {
    async fn handle(
        &self,
        body: &[u8],
        ctx: &RequestContext,
        uow: &mut UnitOfWork,
    ) -> ApiResult<Reply>;
}

/// Read-only handler; no transactional scope, queries go straight to the
/// pool.
#[async_trait]
pub trait ReadHandler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext, db: &Database) -> ApiResult<Reply>;
}

/// Authenticated, transactional dispatch: buffer the body, open a unit of
/// work, run the handler, then commit or roll back on its outcome.
pub async fn run_tx(
    state: &AppState,
    handler: &dyn TxHandler,
    user: &AuthenticatedUser,
    params: HashMap<String, String>,
    request: Request,
) -> Response {
    let (ctx, body) = match split_request(request, params, &user.subject_id).await {
        Ok(parts) => parts,
        Err(err) => return err.into_response(),
    };

    let mut uow = match state.db.begin().await {
        Ok(uow) => uow,
        Err(err) => return ApiError::from(err).into_response(),
    };

    match handler.handle(&body, &ctx, &mut uow).await {
        Ok(reply) => match uow.commit().await {
            Ok(()) => reply.into_response(),
            Err(err) => ApiError::from(err).into_response(),
        },
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "failed to roll back unit of work");
            }
            err.into_response()
        }
    }
}

/// Authenticated, read-only dispatch.
pub async fn run_read(
    state: &AppState,
    handler: &dyn ReadHandler,
    user: &AuthenticatedUser,
    params: HashMap<String, String>,
    request: Request,
) -> Response {
    let (ctx, _body) = match split_request(request, params, &user.subject_id).await {
        Ok(parts) => parts,
        Err(err) => return err.into_response(),
    };

    match handler.handle(&ctx, &state.db).await {
        Ok(reply) => reply.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn split_request(
    request: Request,
    params: HashMap<String, String>,
    subject_id: &str,
) -> ApiResult<(RequestContext, Vec<u8>)> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read request body: {}", e)))?;
    let ctx = RequestContext {
        method,
        path,
        params,
        subject_id: subject_id.to_string(),
    };
    Ok((ctx, body.to_vec()))
}

/// Response for the public token-issuing endpoints (login, registration):
/// the fresh token rides in the Authorization header, exposed for browser
/// clients.
pub fn token_response(status: StatusCode, body: serde_json::Value, token: &str) -> Response {
    let mut response = (status, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(token) {
        response.headers_mut().insert(header::AUTHORIZATION, value);
    }
    response.headers_mut().insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Authorization"),
    );
    response
}
