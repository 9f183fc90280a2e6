//! 방 저장소 추상화

pub mod memory;
pub mod remote;

pub use memory::MemoryRoomStore;
pub use remote::RemoteRoomStore;

use crate::room::Room;
use async_trait::async_trait;
use thiserror::Error;

/// 저장소 백엔드 오류
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid room record: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 방 레코드 키-값 저장소.
///
/// 모든 구현은 조회 전에 id를 정규화하고, TTL이 지난 방은 없는 것으로 취급한다.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get_room(&self, id: &str) -> Result<Option<Room>, StoreError>;

    /// 레코드 전체를 덮어쓴다
    async fn save_room(&self, room: &Room) -> Result<(), StoreError>;

    async fn delete_room(&self, id: &str) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str {
        "custom"
    }
}

/// 공백 제거 + 대문자화
pub fn normalize_room_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_ids_are_trimmed_and_uppercased() {
        assert_eq!(normalize_room_id("  ab12cd "), "AB12CD");
        assert_eq!(normalize_room_id("AB12CD"), "AB12CD");
    }
}
