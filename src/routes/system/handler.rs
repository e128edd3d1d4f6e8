use axum::extract::{Extension, Json, State};
use chrono::Utc;

use super::model::{AnalyticsResponse, HealthResponse, RootResponse};
use crate::AppState;
use crate::middleware::{Caller, get_rate_limit_info};
use crate::rate_limit::{BackendState, RateLimitInfo};

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".into(),
        message: "Restaurant AI Assistant is running.".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        features: vec![
            "Session Management".into(),
            "Enhanced Context".into(),
            "Feedback System".into(),
            "Rate Limiting".into(),
        ],
    })
}

#[axum::debug_handler]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.limiter.backend();

    Json(HealthResponse {
        status: "healthy".into(),
        redis_connected: backend == BackendState::Shared,
        rate_limit_backend: backend.as_str().into(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[axum::debug_handler]
pub async fn analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    Json(AnalyticsResponse {
        total_active_sessions: state.conversations.count().await,
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[axum::debug_handler]
pub async fn rate_limit_info(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Json<RateLimitInfo> {
    Json(get_rate_limit_info(&state.limiter, &caller.user_id, &caller.tier).await)
}
