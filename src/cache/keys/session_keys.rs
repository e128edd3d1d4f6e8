/// 会话缓存键前缀
const SESSION_PREFIX: &str = "session:";

/// 所有会话键的匹配模式
pub const SESSION_PATTERN: &str = "session:*";

/// 反馈列表键
pub const FEEDBACK_KEY: &str = "feedback";

/// 生成会话缓存键
pub fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_PREFIX, session_id)
}
