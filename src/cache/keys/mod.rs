/// 缓存键模块
/// 提供各种缓存键生成函数

// 限流键模块
pub mod rate_limit_keys;

// 会话键模块
pub mod session_keys;

// 重新导出常用的键生成函数
pub use rate_limit_keys::rate_limit_key;
pub use session_keys::{FEEDBACK_KEY, SESSION_PATTERN, session_key};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(rate_limit_key("u1"), "rate_limit:u1");
        assert_eq!(session_key("abc"), "session:abc");
    }
}
