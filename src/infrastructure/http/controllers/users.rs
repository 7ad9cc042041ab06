use crate::application::services::auth::hash_password;
use crate::domain::models::user::User;
use crate::infrastructure::http::middleware::auth::AppState;
use crate::infrastructure::http::middleware::error::ApiError;
use crate::infrastructure::http::pipeline::token_response;
use crate::infrastructure::persistence::users;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Public endpoint: registration. Transactional like any other write, and
/// it logs the new user straight in by returning a signed token.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Response {
    if input.email.is_empty() || input.password.is_empty() {
        return ApiError::BadRequest("email and password are required".to_string())
            .into_response();
    }

    let digest = match hash_password(&input.password) {
        Ok(digest) => digest,
        Err(err) => return err.into_response(),
    };
    let user = User::new(input.email, digest, input.first_name, input.last_name);

    let mut uow = match state.db.begin().await {
        Ok(uow) => uow,
        Err(err) => return ApiError::from(err).into_response(),
    };
    if let Err(err) = users::insert(uow.connection(), &user).await {
        return ApiError::from(err).into_response();
    }
    if let Err(err) = uow.commit().await {
        return ApiError::from(err).into_response();
    }

    match state.authenticator.sign(&user.id) {
        Ok(token) => token_response(StatusCode::OK, json!({ "userId": user.id }), &token),
        Err(err) => err.into_response(),
    }
}
