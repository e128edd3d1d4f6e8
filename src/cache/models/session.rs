use serde::{Deserialize, Serialize};

/// 会话中单条消息的缓存格式
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Human,
    Ai,
}
