//! 고정 윈도우 요청 제한

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::tasks::PeriodicTask;
use axum::http::HeaderMap;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// 식별할 수 없는 클라이언트가 공유하는 버킷
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: u64,
}

/// 요청 제한 검사 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: u64,
}

impl RateLimitDecision {
    /// 재시도까지 남은 초 (최소 1)
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset_at_ms.saturating_sub(now_ms).div_ceil(1000).max(1)
    }
}

pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window_ms: u64,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: config.max_requests,
            window_ms: config.window_ms,
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// 요청 1회를 소비한다. 거절된 요청은 카운트하지 않는다.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = self.clock.now_ms();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: 0,
        });
        let window = entry.value_mut();

        if window.count == 0 || now >= window.reset_at {
            *window = Window {
                count: 1,
                reset_at: now + self.window_ms,
            };
            return self.decision(true, self.max_requests.saturating_sub(1), window.reset_at);
        }

        if window.count >= self.max_requests {
            return self.decision(false, 0, window.reset_at);
        }

        window.count += 1;
        self.decision(true, self.max_requests - window.count, window.reset_at)
    }

    fn decision(&self, allowed: bool, remaining: u32, reset_at_ms: u64) -> RateLimitDecision {
        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining,
            reset_at_ms,
        }
    }

    /// 윈도우가 끝난 항목 정리. `check` 결과에는 영향 없음
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.windows.len();
        self.windows.retain(|_, window| now < window.reset_at);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(removed, "Rate limit entries swept");
        }
        removed
    }

    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> PeriodicTask {
        let limiter = Arc::downgrade(self);
        PeriodicTask::spawn("rate-limit-sweep", period, move || {
            let limiter = limiter.clone();
            async move {
                if let Some(limiter) = limiter.upgrade() {
                    limiter.sweep();
                }
            }
        })
    }
}

/// 프록시 헤더에서 클라이언트 식별자 추출
pub fn client_identifier(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .or_else(|| header("cf-connecting-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
