use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户反馈记录
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedFeedback {
    pub session_id: String,
    pub message_id: String,
    pub rating: u8,
    pub feedback: Option<String>,
    pub timestamp: DateTime<Utc>,
}
