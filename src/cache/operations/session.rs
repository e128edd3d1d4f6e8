use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::cache::keys::{SESSION_PATTERN, session_key};
use crate::cache::models::session::CachedMessage;

/// 会话缓存操作
pub struct SessionCacheOperations;

impl SessionCacheOperations {
    /// 缓存会话消息
    pub async fn cache_session(
        conn: &mut MultiplexedConnection,
        session_id: &str,
        messages: &[CachedMessage],
        ttl: u64,
    ) -> Result<(), redis::RedisError> {
        let json = serde_json::to_string(messages).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "Serialization error", e.to_string()))
        })?;

        let _: () = conn.set_ex(session_key(session_id), json, ttl).await?;

        Ok(())
    }

    /// 获取会话消息
    pub async fn get_session(
        conn: &mut MultiplexedConnection,
        session_id: &str,
    ) -> Result<Option<Vec<CachedMessage>>, redis::RedisError> {
        let result: Option<String> = conn.get(session_key(session_id)).await?;

        match result {
            Some(json) => {
                let messages = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(messages))
            }
            None => Ok(None),
        }
    }

    /// 删除会话
    pub async fn remove_session(
        conn: &mut MultiplexedConnection,
        session_id: &str,
    ) -> Result<(), redis::RedisError> {
        let _: () = conn.del(session_key(session_id)).await?;

        Ok(())
    }

    /// 统计未过期的会话数
    pub async fn count_sessions(conn: &mut MultiplexedConnection) -> Result<usize, redis::RedisError> {
        let keys: Vec<String> = conn.keys(SESSION_PATTERN).await?;

        Ok(keys.len())
    }
}
