//! 시간 소스 추상화

use std::time::{SystemTime, UNIX_EPOCH};

/// 밀리초 단위 현재 시각 (유닉스 에포크 기준)
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// 시스템 시계
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub mod testing {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// 테스트용 수동 시계
    #[derive(Debug, Default)]
    pub struct ManualClock(AtomicU64);

    impl ManualClock {
        pub fn new(start_ms: u64) -> Self {
            Self(AtomicU64::new(start_ms))
        }

        pub fn advance(&self, ms: u64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
