use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::cache::{CachedFeedback, CachedMessage};

mod memory;
mod redis_store;

pub use memory::MemoryConversationStore;
pub use redis_store::RedisConversationStore;

/// 会话历史存储
///
/// 与限流一样不向调用方暴露后端错误，失败时读到空历史。
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Vec<CachedMessage>;

    async fn put(&self, session_id: &str, messages: &[CachedMessage]);

    async fn clear(&self, session_id: &str);

    /// 当前活跃会话数
    async fn count(&self) -> usize;

    async fn record_feedback(&self, feedback: &CachedFeedback);
}

pub fn select_conversation_store(
    shared: Option<MultiplexedConnection>,
    session_ttl: u64,
    timeout: Duration,
) -> Arc<dyn ConversationStore> {
    match shared {
        Some(conn) => Arc::new(RedisConversationStore::new(conn, session_ttl, timeout)),
        None => Arc::new(MemoryConversationStore::new()),
    }
}
