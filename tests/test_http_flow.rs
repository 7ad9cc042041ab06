mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use catnap::infrastructure::http::router::build_router;
use helpers::state::test_state;
use helpers::test_db::{count_cats, setup_test_db};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn auth_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn test_registration_login_and_cat_lifecycle() {
    let db = setup_test_db().await;
    let app = build_router(test_state(db.clone(), Duration::from_secs(10)));

    // Register; the response logs the new user in.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/users",
            None,
            json!({"email": "fe@example.com", "password": "meow meow meow", "firstName": "Fe"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(auth_header(&response).is_some());
    let body = response_json(response).await;
    assert!(body["userId"].is_string());

    // Wrong password is unauthorized, indistinguishable from a missing
    // account.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/auth",
            None,
            json!({"email": "fe@example.com", "password": "woof"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response_json(response).await,
        json!({"error": "incorrect email / password"})
    );

    // Real login yields the working token.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/auth",
            None,
            json!({"email": "fe@example.com", "password": "meow meow meow"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = auth_header(&response).unwrap();

    // Create a cat.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/cats",
            Some(&token),
            json!({"name": "Whiskers", "gender": "MALE"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    // Every authenticated response carries a refreshed token.
    assert!(auth_header(&response).is_some());
    let cat_id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // An accidental double submission replays the first outcome instead of
    // creating a second cat.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/cats",
            Some(&token),
            json!({"name": "Whiskers", "gender": "MALE"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["id"], cat_id.as_str());
    assert_eq!(count_cats(&db).await, 1);

    // A different payload is a different request and does create.
    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/cats",
            Some(&token),
            json!({"name": "Mittens", "gender": "FEMALE"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(count_cats(&db).await, 2);

    // Read it back.
    let response = send(
        &app,
        json_request("GET", &format!("/v1/cats/{}", cat_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["name"], "Whiskers");

    // Rename it.
    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/v1/cats/{}", cat_id),
            Some(&token),
            json!({"name": "Sir Whiskers", "gender": "MALE"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Delete it; the duplicate delete replays the success even though the
    // row is already gone.
    let response = send(
        &app,
        json_request("DELETE", &format!("/v1/cats/{}", cat_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        json_request("DELETE", &format!("/v1/cats/{}", cat_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(count_cats(&db).await, 1);

    // Reading the deleted cat is a miss.
    let response = send(
        &app,
        json_request("GET", &format!("/v1/cats/{}", cat_id), Some(&token), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_reject_missing_and_bad_tokens() {
    let db = setup_test_db().await;
    let app = build_router(test_state(db, Duration::from_secs(10)));

    let response = send(
        &app,
        json_request("POST", "/v1/cats", None, json!({"name": "X", "gender": "MALE"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response_json(response).await,
        json!({"error": "missing authorization header"})
    );

    let response = send(
        &app,
        json_request(
            "POST",
            "/v1/cats",
            Some("garbage-token"),
            json!({"name": "X", "gender": "MALE"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let db = setup_test_db().await;
    let app = build_router(test_state(db, Duration::from_secs(10)));

    let input = json!({"email": "twice@example.com", "password": "meow meow meow"});
    let response = send(&app, json_request("POST", "/v1/users", None, input.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, json_request("POST", "/v1/users", None, input)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_health_is_public() {
    let db = setup_test_db().await;
    let app = build_router(test_state(db, Duration::from_secs(10)));

    let response = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({"status": "ok"}));
}
