use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use super::{BackendState, RequestStore};
use crate::cache::operations::RateLimitCacheOperations;

/// 基于 Redis 有序集合的共享存储，多个进程实例共用同一份计数
#[derive(Clone)]
pub struct RedisRequestStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisRequestStore {
    pub fn new(conn: MultiplexedConnection, timeout: Duration) -> Self {
        Self { conn, timeout }
    }

    /// 超时或出错都只记日志，返回 None
    async fn guarded<T, F>(&self, op: &str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::error!("Redis {} failed for {}: {}", op, key, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Redis {} timed out after {:?} for {}",
                    op,
                    self.timeout,
                    key
                );
                None
            }
        }
    }
}

#[async_trait]
impl RequestStore for RedisRequestStore {
    async fn prune_and_fetch(&self, key: &str, now: f64, window_secs: u64) -> Vec<f64> {
        let mut conn = self.conn.clone();
        let cutoff = now - window_secs as f64;

        self.guarded(
            "prune_and_fetch",
            key,
            RateLimitCacheOperations::prune_and_fetch(&mut conn, key, cutoff),
        )
        .await
        .unwrap_or_default()
    }

    async fn record(&self, key: &str, timestamp: f64, window_secs: u64) {
        let mut conn = self.conn.clone();

        self.guarded(
            "record",
            key,
            RateLimitCacheOperations::record(&mut conn, key, timestamp, window_secs),
        )
        .await;
    }

    fn backend(&self) -> BackendState {
        BackendState::Shared
    }
}
