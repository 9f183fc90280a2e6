//! 애플리케이션 상태 관리

use crate::clock::Clock;
use crate::config::Config;
use crate::coordinator::RoomCoordinator;
use crate::rate_limit::RateLimiter;
use crate::realtime::{HttpPublisher, LocalHub, RoomNotifier};
use crate::store::{MemoryRoomStore, RemoteRoomStore, RoomStore};
use crate::tasks::PeriodicTask;
use std::sync::Arc;

/// 전역 애플리케이션 상태
pub struct AppState {
    pub coordinator: RoomCoordinator,
    pub limiter: Arc<RateLimiter>,
    /// 프로세스 내부 실시간 허브 (외부 발행 사용 시 None)
    pub hub: Option<Arc<LocalHub>>,
    /// 설정
    pub config: Arc<Config>,
}

impl AppState {
    /// 설정에 따라 저장소/알림 백엔드를 구성하고 정리 작업을 시작한다
    pub fn build(
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<(Self, Vec<PeriodicTask>)> {
        let mut tasks = Vec::new();

        let store: Arc<dyn RoomStore> = match &config.store.url {
            Some(url) => {
                tracing::info!(url = %url, "Using remote room store");
                Arc::new(RemoteRoomStore::new(
                    url,
                    &config.store,
                    clock.clone(),
                    config.room.ttl_ms,
                )?)
            }
            None => {
                tracing::info!("Using in-memory room store");
                let memory = Arc::new(MemoryRoomStore::new(clock.clone(), config.room.ttl_ms));
                tasks.push(memory.spawn_sweeper(config.room.sweep_interval()));
                let store: Arc<dyn RoomStore> = memory;
                store
            }
        };

        let (notifier, hub): (Arc<dyn RoomNotifier>, Option<Arc<LocalHub>>) =
            match &config.realtime.publish_url {
                Some(url) => {
                    tracing::info!(url = %url, "Publishing room events to external channel");
                    let publisher: Arc<dyn RoomNotifier> =
                        Arc::new(HttpPublisher::new(url, &config.realtime)?);
                    (publisher, None)
                }
                None => {
                    let hub = Arc::new(LocalHub::new(&config.realtime.channel_prefix));
                    let notifier: Arc<dyn RoomNotifier> = hub.clone();
                    (notifier, Some(hub))
                }
            };

        let limiter = Arc::new(RateLimiter::new(&config.rate_limit, clock.clone()));
        tasks.push(limiter.spawn_sweeper(config.rate_limit.sweep_interval()));

        let state = Self {
            coordinator: RoomCoordinator::new(store, notifier, clock),
            limiter,
            hub,
            config: Arc::new(config),
        };
        Ok((state, tasks))
    }
}
