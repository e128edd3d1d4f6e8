// 缓存模块
// 包含缓存数据结构和操作逻辑

pub mod keys;
pub mod models;
pub mod operations;

use std::time::Duration;

use redis::aio::MultiplexedConnection;

// 重新导出常用类型和函数，方便其他模块使用
pub use models::{CachedFeedback, CachedMessage, MessageKind};

/// 启动时探测 Redis，连接并 PING 成功才返回连接
///
/// 探测只做一次，之后不会重新选择后端。
pub async fn connect(redis_url: &str, timeout: Duration) -> Option<MultiplexedConnection> {
    let client = match redis::Client::open(redis_url) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Invalid Redis URL {}: {}", redis_url, e);
            return None;
        }
    };

    let ping = async {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok::<_, redis::RedisError>(conn)
    };

    match tokio::time::timeout(timeout, ping).await {
        Ok(Ok(conn)) => {
            tracing::info!("Redis connection established");
            Some(conn)
        }
        Ok(Err(e)) => {
            tracing::warn!("Redis connection failed: {}. Using in-memory storage.", e);
            None
        }
        Err(_) => {
            tracing::warn!(
                "Redis connection timed out after {:?}. Using in-memory storage.",
                timeout
            );
            None
        }
    }
}
