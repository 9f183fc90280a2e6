//! 방 변경 실시간 알림

pub mod http;
pub mod local;

pub use http::HttpPublisher;
pub use local::LocalHub;

use crate::protocol::RoomEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("publish rejected with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 방 채널에 변경 이벤트를 발행하는 기능
#[async_trait]
pub trait RoomNotifier: Send + Sync {
    async fn publish(&self, event: &RoomEvent) -> Result<(), NotifyError>;
}

/// 채널 이름 = 접두사 + 방 코드
pub fn channel_name(prefix: &str, room_id: &str) -> String {
    format!("{}{}", prefix, room_id)
}

/// 알림을 백그라운드로 발행. 실패는 로그만 남긴다.
pub fn notify_in_background(notifier: Arc<dyn RoomNotifier>, event: RoomEvent) {
    tokio::spawn(async move {
        if let Err(e) = notifier.publish(&event).await {
            tracing::warn!(room_id = %event.room_id, error = %e, "Room notification failed");
        }
    });
}
