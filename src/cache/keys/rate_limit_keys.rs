/// 限流窗口键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 生成限流窗口键，每个用户一个
pub fn rate_limit_key(user_id: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, user_id)
}
