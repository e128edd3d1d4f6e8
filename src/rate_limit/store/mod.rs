use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

mod memory;
mod redis_store;

pub use memory::LocalRequestStore;
pub use redis_store::RedisRequestStore;

/// 当前生效的存储后端，启动时探测一次后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Shared,
    Fallback,
}

impl BackendState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendState::Shared => "shared",
            BackendState::Fallback => "fallback",
        }
    }
}

/// 滑动窗口请求日志的存储
///
/// 两个实现都不向外返回错误：共享后端出错时记录日志，读取返回空、写入跳过。
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 删除 `timestamp <= now - window_secs` 的记录，返回窗口内剩余的时间戳
    async fn prune_and_fetch(&self, key: &str, now: f64, window_secs: u64) -> Vec<f64>;

    /// 追加一条请求记录
    async fn record(&self, key: &str, timestamp: f64, window_secs: u64);

    fn backend(&self) -> BackendState;
}

/// 根据启动探测的结果选择存储后端
pub fn select_store(
    shared: Option<MultiplexedConnection>,
    timeout: Duration,
) -> Arc<dyn RequestStore> {
    match shared {
        Some(conn) => {
            tracing::info!("Rate limiting backed by shared Redis store");
            Arc::new(RedisRequestStore::new(conn, timeout))
        }
        None => {
            tracing::warn!("Rate limiting falls back to in-process store");
            Arc::new(LocalRequestStore::new())
        }
    }
}
