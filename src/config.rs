//! 환경 변수 기반 설정 관리

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub room: RoomConfig,
    pub store: StoreConfig,
    pub rate_limit: RateLimitConfig,
    pub realtime: RealtimeConfig,
    pub log_level: String,
}

/// 방 설정
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// 마지막 갱신 이후 방이 유지되는 시간
    pub ttl_ms: u64,
    pub sweep_interval_secs: u64,
}

/// 외부 방 저장소 설정. `url`이 비어 있으면 인메모리 저장소 사용
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_ms: u64,
}

/// 요청 제한 설정
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
    pub sweep_interval_secs: u64,
}

/// 실시간 알림 설정. `publish_url`이 비어 있으면 프로세스 내부 허브 사용
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub publish_url: Option<String>,
    pub token: Option<String>,
    pub channel_prefix: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5502,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
            room: RoomConfig {
                ttl_ms: 24 * 60 * 60 * 1000,
                sweep_interval_secs: 60 * 60,
            },
            store: StoreConfig {
                url: None,
                token: None,
                timeout_ms: 5000,
            },
            rate_limit: RateLimitConfig {
                max_requests: 30,
                window_ms: 60_000,
                sweep_interval_secs: 5 * 60,
            },
            realtime: RealtimeConfig {
                publish_url: None,
                token: None,
                channel_prefix: "room-".to_string(),
                timeout_ms: 5000,
            },
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            port: parse_or("PORT", defaults.port),
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            room: RoomConfig {
                ttl_ms: parse_or("ROOM_TTL_MS", defaults.room.ttl_ms),
                sweep_interval_secs: parse_or(
                    "ROOM_SWEEP_INTERVAL_SECS",
                    defaults.room.sweep_interval_secs,
                ),
            },
            store: StoreConfig {
                url: non_empty("ROOM_STORE_URL"),
                token: non_empty("ROOM_STORE_TOKEN"),
                timeout_ms: parse_or("ROOM_STORE_TIMEOUT_MS", defaults.store.timeout_ms),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_or("RATE_LIMIT_MAX", defaults.rate_limit.max_requests),
                window_ms: parse_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit.window_ms),
                sweep_interval_secs: parse_or(
                    "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                    defaults.rate_limit.sweep_interval_secs,
                ),
            },
            realtime: RealtimeConfig {
                publish_url: non_empty("REALTIME_PUBLISH_URL"),
                token: non_empty("REALTIME_TOKEN"),
                channel_prefix: env::var("REALTIME_CHANNEL_PREFIX")
                    .unwrap_or(defaults.realtime.channel_prefix),
                timeout_ms: parse_or("REALTIME_TIMEOUT_MS", defaults.realtime.timeout_ms),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

impl RoomConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RealtimeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl RateLimitConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
