//! 프로세스 내부 브로드캐스트 허브 (WebSocket 구독자용)

use super::{channel_name, NotifyError, RoomNotifier};
use crate::protocol::RoomEvent;
use crate::store::normalize_room_id;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
pub struct LocalHub {
    /// 채널 이름 -> 송신자
    channels: DashMap<String, broadcast::Sender<RoomEvent>>,
    prefix: String,
}

impl LocalHub {
    pub fn new(prefix: &str) -> Self {
        Self {
            channels: DashMap::new(),
            prefix: prefix.to_string(),
        }
    }

    pub fn channel_for(&self, room_id: &str) -> String {
        channel_name(&self.prefix, &normalize_room_id(room_id))
    }

    /// 방 채널 구독
    pub fn subscribe(&self, room_id: &str) -> (String, broadcast::Receiver<RoomEvent>) {
        let channel = self.channel_for(room_id);
        let receiver = self
            .channels
            .entry(channel.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        (channel, receiver)
    }

    /// 구독자가 남지 않은 채널 제거
    pub fn unsubscribe(&self, channel: &str) -> bool {
        let removed = self
            .channels
            .remove_if(channel, |_, sender| sender.receiver_count() == 0)
            .is_some();
        if removed {
            tracing::debug!(channel = %channel, "Idle realtime channel dropped");
        }
        removed
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[async_trait]
impl RoomNotifier for LocalHub {
    async fn publish(&self, event: &RoomEvent) -> Result<(), NotifyError> {
        let channel = self.channel_for(&event.room_id);

        let delivered = match self.channels.get(&channel) {
            Some(sender) => sender.send(event.clone()).unwrap_or(0),
            None => return Ok(()),
        };

        if delivered == 0 {
            // 구독자가 모두 떠난 채널 정리
            self.channels
                .remove_if(&channel, |_, sender| sender.receiver_count() == 0);
        }

        tracing::debug!(channel = %channel, delivered, "Room event published");
        Ok(())
    }
}
