use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::cache::keys::FEEDBACK_KEY;
use crate::cache::models::feedback::CachedFeedback;

/// 反馈缓存操作
pub struct FeedbackCacheOperations;

impl FeedbackCacheOperations {
    /// 追加一条反馈到列表头部
    pub async fn push_feedback(
        conn: &mut MultiplexedConnection,
        feedback: &CachedFeedback,
    ) -> Result<(), redis::RedisError> {
        let json = serde_json::to_string(feedback).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "Serialization error", e.to_string()))
        })?;

        let _: () = conn.lpush(FEEDBACK_KEY, json).await?;

        Ok(())
    }
}
