use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::{ApiError, StoreError};
use crate::schema::{LoginSchema, SignupSchema};
use crate::store::UserStore;
use crate::token::TokenKeys;

// State shared by the identity service handlers
pub struct UserServiceState {
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenKeys,
    pub started: Instant,
}

impl UserServiceState {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenKeys) -> Self {
        Self {
            users,
            tokens,
            started: Instant::now(),
        }
    }
}

pub fn create_router(state: Arc<UserServiceState>) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/health", get(health_checker_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Handler for user signup
async fn signup(
    State(state): State<Arc<UserServiceState>>,
    Json(body): Json<SignupSchema>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(username = %body.username, "received signup request");

    match state
        .users
        .insert_unique(&body.username, &body.password)
        .await
    {
        Ok(user) => {
            tracing::info!(username = %user.username, "new user created");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "User created successfully" })),
            ))
        }
        Err(err) => {
            // Conflict and any other store failure share the same generic
            // response; callers cannot distinguish a duplicate username.
            if let StoreError::Conflict = err {
                tracing::warn!(username = %body.username, "username already taken");
            }
            Err(ApiError::internal("Error creating user"))
        }
    }
}

// Handler for user login
async fn login(
    State(state): State<Arc<UserServiceState>>,
    Json(body): Json<LoginSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_one(&body.username, &body.password)
        .await
        .map_err(|_| ApiError::internal("Internal server error"))?;

    let user = match user {
        Some(user) => user,
        None => {
            tracing::warn!(username = %body.username, "invalid login attempt");
            return Err(ApiError::InvalidCredentials);
        }
    };

    // Token valid for 1 hour
    let token = state
        .tokens
        .issue(&user)
        .map_err(|_| ApiError::internal("Internal server error"))?;

    tracing::info!(username = %user.username, "user logged in");
    Ok(Json(json!({ "token": token })))
}

// Handler for the health checker route
async fn health_checker_handler(
    State(state): State<Arc<UserServiceState>>,
) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

// Handler for unknown routes
async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "The requested resource does not exist.",
        })),
    )
}
