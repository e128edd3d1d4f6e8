use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

/// 重试策略：总尝试次数和退避区间
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl Backoff {
    fn builder(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }

    /// 重试直到成功或用完次数，返回最后一次的错误
    pub fn retry<T, E, F, Fut>(
        &self,
        op_name: &str,
        op: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        op.retry(self.builder()).notify(move |e: &E, delay: Duration| {
            tracing::warn!("{} failed: {}. Retrying in {:?}", op_name, e, delay);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use backon::BackoffBuilder;

    use super::*;

    fn fast() -> Backoff {
        Backoff {
            max_attempts: 3,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn default_delays_grow_and_are_capped() {
        let delays: Vec<Duration> = Backoff::default().builder().build().collect();
        assert_eq!(delays, [Duration::from_secs(4), Duration::from_secs(8)]);

        let long = Backoff {
            max_attempts: 5,
            ..Backoff::default()
        };
        let delays: Vec<Duration> = long.builder().build().collect();
        assert_eq!(delays.len(), 4);
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = fast()
            .retry("flaky", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err(format!("attempt {}", n)) } else { Ok(n) }
            })
            .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = fast()
            .retry("broken", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            })
            .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
