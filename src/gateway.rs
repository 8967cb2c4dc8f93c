use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, get_service, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::Config;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream returned a malformed body: {0}")]
    MalformedBody(String),
}

/// Capability for reaching a backend service.
///
/// The gateway never talks to the network directly; it goes through this
/// trait so tests can inject failures and canned responses.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Forward one request and return the upstream status and JSON body
    /// verbatim. No retries, no timeout override, no body transformation.
    async fn forward(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), UpstreamError>;
}

/// reqwest-backed upstream client used by the gateway binary.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
}

impl HttpUpstreamClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn forward(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), UpstreamError> {
        let mut request = self.client.request(method, url);
        if let Some(auth) = authorization {
            request = request.header(header::AUTHORIZATION, auth);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|err| UpstreamError::MalformedBody(err.to_string()))?
        };

        Ok((status, value))
    }
}

// State shared by the gateway handlers
pub struct GatewayState {
    pub upstream: Arc<dyn UpstreamClient>,
    pub user_service_url: String,
    pub todo_service_url: String,
    pub started: Instant,
}

impl GatewayState {
    pub fn new(upstream: Arc<dyn UpstreamClient>, config: &Config) -> Self {
        Self {
            upstream,
            user_service_url: config.user_service_url.clone(),
            todo_service_url: config.todo_service_url.clone(),
            started: Instant::now(),
        }
    }
}

pub fn create_router(state: Arc<GatewayState>, config: &Config) -> Router {
    Router::new()
        .route("/signup", post(proxy_signup))
        .route("/login", post(proxy_login))
        .route("/todos", get(proxy_get_todos).post(proxy_create_todo))
        .route(
            "/todos/:id",
            put(proxy_update_todo)
                .patch(proxy_update_todo)
                .delete(proxy_delete_todo),
        )
        .route("/health", get(health_checker_handler))
        .route(
            "/home",
            get_service(ServeFile::new(config.public_dir.join("index.html"))),
        )
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Relay an upstream outcome to the client, status and body unchanged. A
/// transport-level failure degrades to a generic internal error.
fn relay(
    result: Result<(StatusCode, Value), UpstreamError>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match result {
        Ok((status, body)) => Ok((status, Json(body))),
        Err(err) => Err(ApiError::Upstream(err.to_string())),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

// ─── Auth proxy ──────────────────────────────────────────────────────────────

async fn proxy_signup(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/signup", state.user_service_url);
    relay(
        state
            .upstream
            .forward(Method::POST, &url, None, Some(&body))
            .await,
    )
}

async fn proxy_login(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/login", state.user_service_url);
    relay(
        state
            .upstream
            .forward(Method::POST, &url, None, Some(&body))
            .await,
    )
}

// ─── Todo proxy ──────────────────────────────────────────────────────────────

async fn proxy_get_todos(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/todos", state.todo_service_url);
    relay(
        state
            .upstream
            .forward(Method::GET, &url, bearer(&headers), None)
            .await,
    )
}

async fn proxy_create_todo(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/todos", state.todo_service_url);
    relay(
        state
            .upstream
            .forward(Method::POST, &url, bearer(&headers), Some(&body))
            .await,
    )
}

async fn proxy_update_todo(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    method: Method,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/todos/{}", state.todo_service_url, id);
    relay(
        state
            .upstream
            .forward(method, &url, bearer(&headers), Some(&body))
            .await,
    )
}

async fn proxy_delete_todo(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let url = format!("{}/todos/{}", state.todo_service_url, id);
    relay(
        state
            .upstream
            .forward(Method::DELETE, &url, bearer(&headers), None)
            .await,
    )
}

// ─── Static & health ─────────────────────────────────────────────────────────

async fn health_checker_handler(
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not Found", "message": "No such route" })),
    )
}
