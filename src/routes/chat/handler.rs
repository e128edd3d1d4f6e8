use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};

use super::model::{ConversationResponse, FeedbackRequest, RagRequest, StatusResponse};
use crate::AppState;
use crate::error::AppError;

#[axum::debug_handler]
pub async fn ask_rag(
    State(state): State<AppState>,
    Json(req): Json<RagRequest>,
) -> Result<Json<ConversationResponse>, AppError> {
    let response = ConversationResponse::answer(&state, req).await.inspect_err(|e| {
        tracing::error!("Error in ask_rag: {}", e);
    })?;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    FeedbackRequest::submit(&state, req).await?;

    Ok(Json(StatusResponse::success("Feedback submitted successfully")))
}

#[axum::debug_handler]
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<StatusResponse> {
    state.conversations.clear(&session_id).await;

    Json(StatusResponse::success(format!(
        "Session {} cleared",
        session_id
    )))
}
