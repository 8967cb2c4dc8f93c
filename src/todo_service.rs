use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{self, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::schema::{CreateTodoSchema, UpdateTodoSchema};
use crate::store::TodoStore;
use crate::token::{Claims, TokenKeys};

// State shared by the todo service handlers
pub struct TodoServiceState {
    pub todos: Arc<dyn TodoStore>,
    pub tokens: TokenKeys,
    pub started: Instant,
}

impl TodoServiceState {
    pub fn new(todos: Arc<dyn TodoStore>, tokens: TokenKeys) -> Self {
        Self {
            todos,
            tokens,
            started: Instant::now(),
        }
    }
}

pub fn create_router(state: Arc<TodoServiceState>) -> Router {
    Router::new()
        .route("/todos", get(get_todos).post(create_todo))
        .route(
            "/todos/:id",
            put(update_todo).patch(update_todo).delete(delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ))
        .route("/health", get(health_checker_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer-token gate applied to every todo route.
///
/// Pure function of (Authorization header, shared secret, current time):
/// on success the decoded claims are attached to the request extensions,
/// and no store lookup re-validates the user's existence.
pub async fn mw_require_auth<B>(
    State(state): State<Arc<TodoServiceState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let auth_header = match auth_header {
        Some(auth_header) => auth_header,
        None => {
            tracing::warn!("unauthorized access attempt - no token provided");
            return Err(ApiError::MissingToken);
        }
    };

    let token = auth_header
        .strip_prefix("Bearer ")
        .unwrap_or(auth_header);

    let claims = state.tokens.verify(token).map_err(|err| {
        tracing::warn!(error = %err, "invalid token");
        ApiError::InvalidToken
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

// Handler for getting all Todo items of the authenticated user
async fn get_todos(
    State(state): State<Arc<TodoServiceState>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = state
        .todos
        .find_many(&claims.id)
        .await
        .map_err(|_| ApiError::internal("Error fetching todos"))?;

    tracing::info!(username = %claims.username, count = todos.len(), "todos fetched");
    Ok(Json(todos))
}

// Handler for creating a new Todo
async fn create_todo(
    State(state): State<Arc<TodoServiceState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateTodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .todos
        .insert(&claims.id, &body.title)
        .await
        .map_err(|_| ApiError::internal("Error creating todo"))?;

    tracing::info!(username = %claims.username, "new todo added");
    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for updating a Todo by ID
async fn update_todo(
    State(state): State<Arc<TodoServiceState>>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateTodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .todos
        .find_one_and_update(&id, &claims.id, &body.title, body.completed)
        .await
        .map_err(|_| ApiError::internal("Error updating todo"))?;

    match updated {
        Some(todo) => {
            tracing::info!(id = %id, username = %claims.username, "todo updated");
            Ok(Json(todo))
        }
        None => {
            tracing::warn!(id = %id, username = %claims.username, "todo not found for update");
            Err(ApiError::TodoNotFound)
        }
    }
}

// Handler for deleting a Todo by ID
async fn delete_todo(
    State(state): State<Arc<TodoServiceState>>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .todos
        .find_one_and_delete(&id, &claims.id)
        .await
        .map_err(|_| ApiError::internal("Error deleting todo"))?;

    match deleted {
        Some(_) => {
            tracing::info!(id = %id, username = %claims.username, "todo deleted");
            Ok(Json(json!({ "message": "Todo deleted successfully" })))
        }
        None => {
            tracing::warn!(id = %id, username = %claims.username, "todo not found for deletion");
            Err(ApiError::TodoNotFound)
        }
    }
}

// Handler for the health checker route
async fn health_checker_handler(
    State(state): State<Arc<TodoServiceState>>,
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
