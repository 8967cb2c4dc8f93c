use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Persistence outcome classification.
///
/// Store backends report failures through this enum instead of letting
/// callers inspect backend-specific error strings. A uniqueness violation
/// is the only cause the services ever branch on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("uniqueness violation")]
    Conflict,
    #[error("store failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return StoreError::Conflict;
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Errors surfaced over the HTTP boundary of any of the three services.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no token provided")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("todo not found")]
    TodoNotFound,
    #[error("{0}")]
    Internal(String),
    #[error("upstream unavailable: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::TodoNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = %status.as_u16(), "request rejected");
        }

        let body = match &self {
            ApiError::MissingToken => json!({ "error": "No token provided" }),
            ApiError::InvalidToken => json!({ "error": "Invalid token" }),
            ApiError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
            ApiError::TodoNotFound => json!({ "error": "Todo not found" }),
            ApiError::Internal(msg) => json!({ "error": msg }),
            ApiError::Upstream(msg) => {
                json!({ "error": "Internal Server Error", "message": msg })
            }
        };

        (status, Json(body)).into_response()
    }
}
