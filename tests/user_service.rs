use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use todo_microservices::store::MemoryStore;
use todo_microservices::token::TokenKeys;
use todo_microservices::user_service::{create_router, UserServiceState};

const SECRET: &str = "testsecret";

fn test_app() -> Router {
    let state = Arc::new(UserServiceState::new(
        Arc::new(MemoryStore::new()),
        TokenKeys::new(SECRET),
    ));
    create_router(state)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn signup_creates_user() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/signup",
            &json!({ "username": "alice", "password": "pw1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "User created successfully" })
    );
}

#[tokio::test]
async fn duplicate_signup_is_generic_server_error() {
    let app = test_app();
    let body = json!({ "username": "alice", "password": "pw1" });

    let first = app.clone().oneshot(post_json("/signup", &body)).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_json("/signup", &body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(second).await,
        json!({ "error": "Error creating user" })
    );
}

#[tokio::test]
async fn login_after_signup_returns_token_with_username_claim() {
    let app = test_app();
    let credentials = json!({ "username": "alice", "password": "pw1" });

    app.clone()
        .oneshot(post_json("/signup", &credentials))
        .await
        .unwrap();

    let response = app.oneshot(post_json("/login", &credentials)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().expect("token in response");

    let claims = TokenKeys::new(SECRET).verify(token).unwrap();
    assert_eq!(claims.username, "alice");
    assert!(!claims.id.is_empty());
}

#[tokio::test]
async fn login_with_unknown_username_is_unauthorized() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/login",
            &json!({ "username": "nobody", "password": "pw" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Invalid credentials" })
    );
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = test_app();

    app.clone()
        .oneshot(post_json(
            "/signup",
            &json!({ "username": "alice", "password": "pw1" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/login",
            &json!({ "username": "alice", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_status_uptime_timestamp() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime"].is_number());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/no-route-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "Not Found",
            "message": "The requested resource does not exist.",
        })
    );
}
