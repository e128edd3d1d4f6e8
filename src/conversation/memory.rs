use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ConversationStore;
use crate::cache::{CachedFeedback, CachedMessage};

/// 进程内会话存储，没有过期时间
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    sessions: RwLock<HashMap<String, Vec<CachedMessage>>>,
    feedback: RwLock<Vec<CachedFeedback>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn feedback(&self) -> Vec<CachedFeedback> {
        self.feedback.read().await.clone()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, session_id: &str) -> Vec<CachedMessage> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn put(&self, session_id: &str, messages: &[CachedMessage]) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), messages.to_vec());
    }

    async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn record_feedback(&self, feedback: &CachedFeedback) {
        self.feedback.write().await.push(feedback.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MessageKind;

    #[tokio::test]
    async fn sessions_round_trip_and_clear() {
        let store = MemoryConversationStore::new();
        assert!(store.get("s1").await.is_empty());

        let messages = vec![
            CachedMessage {
                kind: MessageKind::Human,
                content: "Are you open on Sunday?".into(),
            },
            CachedMessage {
                kind: MessageKind::Ai,
                content: "Yes, from noon.".into(),
            },
        ];
        store.put("s1", &messages).await;
        store.put("s2", &messages[..1]).await;

        assert_eq!(store.get("s1").await, messages);
        assert_eq!(store.count().await, 2);

        store.clear("s1").await;
        assert!(store.get("s1").await.is_empty());
        assert_eq!(store.count().await, 1);
    }
}
