//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use storefront_core::Error as CoreError;

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// No store serves the request's host
    #[error("Unknown host: {0}")]
    UnknownHost(String),

    /// Request is missing its Host header
    #[error("Missing Host header")]
    MissingHost,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Handler result type
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownHost(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MissingHost => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                CoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::InvalidStore(_)
                | CoreError::InvalidHost(_)
                | CoreError::InvalidInput(_)
                | CoreError::Config(_)
                | CoreError::Serialization(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = match &self {
            ApiError::Core(CoreError::AlreadyExists { code, message }) => json!({
                "code": code,
                "message": message,
            }),
            other => json!({
                "code": status.as_u16(),
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
