//! 단일 인스턴스용 인메모리 방 저장소

use super::{normalize_room_id, RoomStore, StoreError};
use crate::clock::Clock;
use crate::room::Room;
use crate::tasks::PeriodicTask;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct MemoryRoomStore {
    /// 방 정보 (정규화된 room_id -> Room)
    rooms: DashMap<String, Room>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
}

impl MemoryRoomStore {
    pub fn new(clock: Arc<dyn Clock>, ttl_ms: u64) -> Self {
        Self {
            rooms: DashMap::new(),
            clock,
            ttl_ms,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// 만료된 방 정리
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl_ms;
        let mut deleted = 0;

        self.rooms.retain(|room_id, room| {
            if room.is_expired(now, ttl_ms) {
                tracing::debug!(room_id = %room_id, "Expired room removed");
                deleted += 1;
                false
            } else {
                true
            }
        });

        if deleted > 0 {
            tracing::info!(deleted_rooms = deleted, remaining = self.rooms.len(), "Room sweep completed");
        }
        deleted
    }

    /// 주기적 정리 작업 시작
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> PeriodicTask {
        let store = Arc::downgrade(self);
        PeriodicTask::spawn("room-sweep", period, move || {
            let store = store.clone();
            async move {
                if let Some(store) = store.upgrade() {
                    store.sweep();
                }
            }
        })
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn get_room(&self, id: &str) -> Result<Option<Room>, StoreError> {
        let key = normalize_room_id(id);
        let now = self.clock.now_ms();

        let room = match self.rooms.get(&key) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };

        if room.is_expired(now, self.ttl_ms) {
            // 조회 사이에 갱신되었을 수 있으므로 다시 확인 후 삭제
            self.rooms
                .remove_if(&key, |_, room| room.is_expired(now, self.ttl_ms));
            tracing::debug!(room_id = %key, "Expired room dropped on read");
            return Ok(None);
        }

        Ok(Some(room))
    }

    async fn save_room(&self, room: &Room) -> Result<(), StoreError> {
        let key = normalize_room_id(&room.id);
        let mut record = room.clone();
        record.id = key.clone();
        self.rooms.insert(key, record);
        Ok(())
    }

    async fn delete_room(&self, id: &str) -> Result<(), StoreError> {
        self.rooms.remove(&normalize_room_id(id));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
