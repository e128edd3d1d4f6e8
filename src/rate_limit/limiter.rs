use std::sync::Arc;

use serde::Serialize;

use super::clock::{Clock, SystemClock};
use super::policy::PolicyTable;
use super::store::{BackendState, RequestStore};
use crate::cache::keys::rate_limit_key;

/// 放行时返回的额度信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: f64,
}

/// 拒绝时返回的信息，用于生成 429 响应
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rejection {
    pub limit: u32,
    pub window: u64,
    pub current_usage: u32,
    pub reset_time: f64,
    pub retry_after_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionResult {
    Admitted(Admission),
    Rejected(Rejection),
}

/// 只读查询的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: f64,
    pub window: u64,
}

/// 滑动窗口日志限流器
///
/// 窗口内的每次请求都单独记录，判断是精确的。先读后写之间没有原子操作，
/// 同一个 key 的并发请求可能多放行一次，这里保留这一行为。
pub struct Limiter {
    policies: PolicyTable,
    store: Arc<dyn RequestStore>,
    clock: Arc<dyn Clock>,
}

impl Limiter {
    pub fn new(policies: PolicyTable, store: Arc<dyn RequestStore>) -> Self {
        Self {
            policies,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> BackendState {
        self.store.backend()
    }

    /// 判断是否放行，放行时记录本次请求
    pub async fn check(&self, user_id: &str, tier: &str) -> AdmissionResult {
        let policy = self.policies.lookup(tier);
        let key = rate_limit_key(user_id);
        let now = self.clock.now();

        let recent = self
            .store
            .prune_and_fetch(&key, now, policy.window_secs)
            .await;
        let used = recent.len() as u32;

        if used >= policy.limit {
            let oldest = recent.iter().copied().fold(f64::INFINITY, f64::min);
            let reset_time = oldest + policy.window_secs as f64;
            let retry_after_secs = (reset_time - now).max(0.0).ceil() as u64;

            tracing::debug!(
                "Rate limit exceeded for {} (tier {}): {}/{} in {}s window",
                user_id,
                tier,
                used,
                policy.limit,
                policy.window_secs
            );

            return AdmissionResult::Rejected(Rejection {
                limit: policy.limit,
                window: policy.window_secs,
                current_usage: used,
                reset_time,
                retry_after_secs,
            });
        }

        self.store.record(&key, now, policy.window_secs).await;

        AdmissionResult::Admitted(Admission {
            limit: policy.limit,
            remaining: policy.limit - used - 1,
            reset_time: now + policy.window_secs as f64,
        })
    }

    /// 查询当前额度，不消耗请求
    pub async fn peek(&self, user_id: &str, tier: &str) -> RateLimitInfo {
        let policy = self.policies.lookup(tier);
        let key = rate_limit_key(user_id);
        let now = self.clock.now();

        let recent = self
            .store
            .prune_and_fetch(&key, now, policy.window_secs)
            .await;

        RateLimitInfo {
            limit: policy.limit,
            remaining: policy.limit.saturating_sub(recent.len() as u32),
            reset_time: now + policy.window_secs as f64,
            window: policy.window_secs,
        }
    }
}
