use crate::infrastructure::http::controllers::{auth, cats, users};
use crate::infrastructure::http::middleware::auth::{require_auth, AppState, AuthenticatedUser};
use crate::infrastructure::http::middleware::dedup::Deduplicate;
use crate::infrastructure::http::pipeline;
use axum::extract::{Path, Request, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // The mutating cat handlers are wrapped for at-most-once execution;
    // updates are left bare because a replayed update converges on its own.
    let create_cat = Arc::new(Deduplicate::for_create(
        cats::CreateCat,
        state.lock.clone(),
        state.results.clone(),
        state.dedup_window,
    ));
    let delete_cat = Arc::new(Deduplicate::for_delete(
        cats::DeleteCat,
        state.lock.clone(),
        state.results.clone(),
        state.dedup_window,
    ));
    let update_cat = Arc::new(cats::UpdateCat);
    let get_cat = Arc::new(cats::GetCat);

    let protected = Router::new()
        .route(
            "/v1/cats",
            post({
                let handler = create_cat.clone();
                move |State(state): State<AppState>,
                      Extension(user): Extension<AuthenticatedUser>,
                      request: Request| async move {
                    pipeline::run_tx(&state, handler.as_ref(), &user, HashMap::new(), request)
                        .await
                }
            }),
        )
        .route(
            "/v1/cats/:cat_id",
            get({
                let handler = get_cat.clone();
                move |State(state): State<AppState>,
                      Path(params): Path<HashMap<String, String>>,
                      Extension(user): Extension<AuthenticatedUser>,
                      request: Request| async move {
                    pipeline::run_read(&state, handler.as_ref(), &user, params, request).await
                }
            })
            .put({
                let handler = update_cat.clone();
                move |State(state): State<AppState>,
                      Path(params): Path<HashMap<String, String>>,
                      Extension(user): Extension<AuthenticatedUser>,
                      request: Request| async move {
                    pipeline::run_tx(&state, handler.as_ref(), &user, params, request).await
                }
            })
            .delete({
                let handler = delete_cat.clone();
                move |State(state): State<AppState>,
                      Path(params): Path<HashMap<String, String>>,
                      Extension(user): Extension<AuthenticatedUser>,
                      request: Request| async move {
                    pipeline::run_tx(&state, handler.as_ref(), &user, params, request).await
                }
            }),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .route("/v1/auth", post(auth::login))
        .route("/v1/users", post(users::create_user));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([header::AUTHORIZATION]),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
