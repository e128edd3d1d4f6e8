/// 缓存数据模型
/// 定义缓存数据的结构体
pub mod feedback;
pub mod session;

// 重新导出常用类型
pub use feedback::CachedFeedback;
pub use session::{CachedMessage, MessageKind};
