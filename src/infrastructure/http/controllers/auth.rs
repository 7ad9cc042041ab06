use crate::application::services::auth::verify_password;
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
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Public endpoint: exchange credentials for a token. Lookup failure and a
/// wrong password produce the same response on purpose.
pub async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> Response {
    if input.email.is_empty() || input.password.is_empty() {
        return ApiError::BadRequest("email and password are required".to_string())
            .into_response();
    }

    let user = match users::find_by_email(state.db.pool(), &input.email).await {
        Ok(user) => user,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let Some(user) = user else {
        return ApiError::Unauthorized("incorrect email / password".to_string()).into_response();
    };
    if !verify_password(&input.password, &user.password_digest) {
        return ApiError::Unauthorized("incorrect email / password".to_string()).into_response();
    }

    match state.authenticator.sign(&user.id) {
        Ok(token) => token_response(StatusCode::OK, json!({ "userId": user.id }), &token),
        Err(err) => err.into_response(),
    }
}
