use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::rag::RagError;
use crate::rate_limit::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("rate limit exceeded")]
    RateLimited(Rejection),
    #[error("invalid or expired token")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RagError> for AppError {
    fn from(e: RagError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Serialize)]
struct RateLimitBody {
    error: &'static str,
    limit: u32,
    window: u64,
    current_usage: u32,
    reset_time: f64,
    retry_after: u64,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::RateLimited(rejection) => return rate_limited(rejection),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid or expired token".into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

fn rate_limited(rejection: Rejection) -> Response {
    let body = Json(RateLimitBody {
        error: "Rate limit exceeded",
        limit: rejection.limit,
        window: rejection.window,
        current_usage: rejection.current_usage,
        reset_time: rejection.reset_time,
        retry_after: rejection.retry_after_secs,
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    response.headers_mut().insert(
        header::RETRY_AFTER,
        HeaderValue::from(rejection.retry_after_secs),
    );
    response
}
