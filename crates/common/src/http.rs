//! Inbound HTTP error envelope shared by both services
//!
//! Only malformed requests and unexpected faults reach clients as error
//! statuses; upstream failures are absorbed before a handler returns.

use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Message returned for unexpected faults. Never carries internal detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Client-visible handler errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidRequest(message) => serde_json::json!({ "error": message }),
            ApiError::Internal => serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }),
        };
        (status, Json(body)).into_response()
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "handler panicked");
    ApiError::Internal.into_response()
}
