use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::cache::{CachedFeedback, CachedMessage, MessageKind};
use crate::error::AppError;
use crate::rag::Prompt;

#[derive(Debug, Deserialize)]
pub struct RagRequest {
    pub question: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub answer: String,
    pub session_id: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: String,
    pub message_id: String,
    pub rating: u8, // 1-5
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
        }
    }
}

impl ConversationResponse {
    /// 检索上下文、生成回答并写回会话历史
    pub async fn answer(state: &AppState, req: RagRequest) -> Result<Self, AppError> {
        if req.question.trim().is_empty() {
            return Err(AppError::BadRequest("question must not be empty".into()));
        }

        let session_id = req
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut history = state.conversations.get(&session_id).await;
        let context = state.retriever.retrieve(&req.question).await?;
        let prompt = Prompt {
            context,
            question: req.question,
        };
        let answer = state.generator.generate(&prompt, &history).await?;

        let sources = (1..=prompt.context.len())
            .map(|i| format!("Context section {}", i))
            .collect();

        history.push(CachedMessage {
            kind: MessageKind::Human,
            content: prompt.question,
        });
        history.push(CachedMessage {
            kind: MessageKind::Ai,
            content: answer.clone(),
        });
        state.conversations.put(&session_id, &history).await;

        Ok(Self {
            confidence: confidence(&answer),
            answer,
            session_id,
            sources,
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}

/// 按回答长度粗略估计，落在 [0.6, 0.9]
pub fn confidence(answer: &str) -> f64 {
    let words = answer.split_whitespace().count() as f64;
    (words / 50.0).clamp(0.6, 0.9)
}

impl FeedbackRequest {
    pub async fn submit(state: &AppState, req: FeedbackRequest) -> Result<(), AppError> {
        if !(1..=5).contains(&req.rating) {
            return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
        }

        let feedback = CachedFeedback {
            session_id: req.session_id,
            message_id: req.message_id,
            rating: req.rating,
            feedback: req.feedback,
            timestamp: Utc::now(),
        };
        state.conversations.record_feedback(&feedback).await;
        tracing::info!("Feedback received: {:?}", feedback);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(confidence("Yes."), 0.6);
        assert_eq!(confidence(&"word ".repeat(40)), 0.8);
        assert_eq!(confidence(&"word ".repeat(200)), 0.9);
    }

    #[test]
    fn extra_request_fields_are_accepted() {
        let req: RagRequest = serde_json::from_value(serde_json::json!({
            "question": "When do you open?",
            "user_context": { "locale": "en" }
        }))
        .unwrap();
        assert_eq!(req.question, "When do you open?");
        assert!(req.session_id.is_none());
    }
}
