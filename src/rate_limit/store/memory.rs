use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{BackendState, RequestStore};

/// 进程内的回退存储，不在多个实例间共享
///
/// 整张表由一把锁保护，锁不会跨 await 持有。
#[derive(Debug, Default)]
pub struct LocalRequestStore {
    requests: Mutex<HashMap<String, Vec<f64>>>,
}

impl LocalRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<f64>>> {
        // 临界区内没有会 panic 的操作，中毒时数据仍然一致
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 当前保存的 key 数量
    pub fn key_count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl RequestStore for LocalRequestStore {
    async fn prune_and_fetch(&self, key: &str, now: f64, window_secs: u64) -> Vec<f64> {
        let cutoff = now - window_secs as f64;
        let mut requests = self.lock();

        let Some(timestamps) = requests.get_mut(key) else {
            return Vec::new();
        };
        timestamps.retain(|&t| t > cutoff);

        if timestamps.is_empty() {
            requests.remove(key);
            return Vec::new();
        }
        timestamps.clone()
    }

    async fn record(&self, key: &str, timestamp: f64, _window_secs: u64) {
        self.lock()
            .entry(key.to_string())
            .or_default()
            .push(timestamp);
    }

    fn backend(&self) -> BackendState {
        BackendState::Fallback
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::future::join_all;

    use super::*;

    #[tokio::test]
    async fn prunes_records_at_or_before_cutoff() {
        let store = LocalRequestStore::new();
        for t in [40.0, 50.0, 50.5, 99.0] {
            store.record("rate_limit:u1", t, 60).await;
        }

        // cutoff = 110 - 60 = 50，等于 cutoff 的记录也要删掉
        let mut remaining = store.prune_and_fetch("rate_limit:u1", 110.0, 60).await;
        remaining.sort_by(f64::total_cmp);
        assert_eq!(remaining, vec![50.5, 99.0]);
    }

    #[tokio::test]
    async fn keeps_duplicate_timestamps() {
        let store = LocalRequestStore::new();
        store.record("rate_limit:u1", 10.0, 60).await;
        store.record("rate_limit:u1", 10.0, 60).await;

        assert_eq!(
            store.prune_and_fetch("rate_limit:u1", 11.0, 60).await,
            vec![10.0, 10.0]
        );
    }

    #[tokio::test]
    async fn drops_keys_once_empty() {
        let store = LocalRequestStore::new();
        store.record("rate_limit:u1", 10.0, 60).await;
        assert_eq!(store.key_count(), 1);

        assert!(store.prune_and_fetch("rate_limit:u1", 70.0, 60).await.is_empty());
        assert_eq!(store.key_count(), 0);
        assert!(store.prune_and_fetch("rate_limit:never", 70.0, 60).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_are_not_lost() {
        let store = Arc::new(LocalRequestStore::new());

        let tasks = (0..200).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store.record("rate_limit:shared", 1.0 + i as f64 * 0.001, 60).await;
            })
        });
        for result in join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(store.prune_and_fetch("rate_limit:shared", 2.0, 60).await.len(), 200);
    }
}
