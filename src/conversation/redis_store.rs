use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use super::ConversationStore;
use crate::cache::operations::{FeedbackCacheOperations, SessionCacheOperations};
use crate::cache::{CachedFeedback, CachedMessage};

/// Redis 会话存储，会话按 TTL 自动过期
#[derive(Clone)]
pub struct RedisConversationStore {
    conn: MultiplexedConnection,
    session_ttl: u64,
    timeout: Duration,
}

impl RedisConversationStore {
    pub fn new(conn: MultiplexedConnection, session_ttl: u64, timeout: Duration) -> Self {
        Self {
            conn,
            session_ttl,
            timeout,
        }
    }

    async fn guarded<T, F>(&self, op: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::error!("Error during session {} in Redis: {}", op, e);
                None
            }
            Err(_) => {
                tracing::warn!("Session {} in Redis timed out after {:?}", op, self.timeout);
                None
            }
        }
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn get(&self, session_id: &str) -> Vec<CachedMessage> {
        let mut conn = self.conn.clone();
        self.guarded("get", SessionCacheOperations::get_session(&mut conn, session_id))
            .await
            .flatten()
            .unwrap_or_default()
    }

    async fn put(&self, session_id: &str, messages: &[CachedMessage]) {
        let mut conn = self.conn.clone();
        self.guarded(
            "save",
            SessionCacheOperations::cache_session(&mut conn, session_id, messages, self.session_ttl),
        )
        .await;
    }

    async fn clear(&self, session_id: &str) {
        let mut conn = self.conn.clone();
        self.guarded("delete", SessionCacheOperations::remove_session(&mut conn, session_id))
            .await;
    }

    async fn count(&self) -> usize {
        let mut conn = self.conn.clone();
        self.guarded("count", SessionCacheOperations::count_sessions(&mut conn))
            .await
            .unwrap_or_default()
    }

    async fn record_feedback(&self, feedback: &CachedFeedback) {
        let mut conn = self.conn.clone();
        self.guarded("feedback", FeedbackCacheOperations::push_feedback(&mut conn, feedback))
            .await;
    }
}
