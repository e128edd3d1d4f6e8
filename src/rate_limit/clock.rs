use std::sync::atomic::{AtomicI64, Ordering};

/// 时间源，单位为 Unix 秒（微秒精度）
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// 手动推进的时钟，测试用
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    pub fn new(start_secs: f64) -> Self {
        Self {
            micros: AtomicI64::new(to_micros(start_secs)),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.micros.fetch_add(to_micros(secs), Ordering::SeqCst);
    }

    pub fn set(&self, secs: f64) {
        self.micros.store(to_micros(secs), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

fn to_micros(secs: f64) -> i64 {
    (secs * 1_000_000.0).round() as i64
}
