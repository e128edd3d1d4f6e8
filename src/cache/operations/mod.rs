/// 缓存操作
/// 提供缓存操作的功能实现

// 限流记录
pub mod rate_limit;

// 会话消息
pub mod session;

// 用户反馈
pub mod feedback;

// 重新导出常用操作
pub use feedback::FeedbackCacheOperations;
pub use rate_limit::RateLimitCacheOperations;
pub use session::SessionCacheOperations;
