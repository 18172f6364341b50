//! Typed error taxonomy for the registration core and its HTTP surface.
//! Business-rule failures carry their own variant; storage failures are wrapped
//! in `Internal` and logged at the boundary, never silently swallowed.

use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Event not found")]
    EventNotFound,

    #[error("Event is not open for registration")]
    EventNotOpen,

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Event is full")]
    EventFull,

    #[error("Registration not found")]
    NotFound,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid email or password")]
    Unauthorized,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Recommendation service unavailable")]
    UpstreamUnavailable,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EventNotFound | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EventNotOpen
            | ApiError::AlreadyRegistered
            | ApiError::EventFull
            | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate into the `(status, {"error": ...})` shape handlers return.
    /// Internal errors are logged here with their source chain and replaced by
    /// a generic body.
    pub fn into_response_parts(self) -> (StatusCode, Json<Value>) {
        if let ApiError::Internal(ref err) = self {
            tracing::error!("Internal error: {:?}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Internal server error"})),
            );
        }
        (
            self.status_code(),
            Json(serde_json::json!({"error": self.to_string()})),
        )
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}
