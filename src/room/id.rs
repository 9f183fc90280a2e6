//! 방 코드 생성

use crate::error::RoomError;
use crate::store::RoomStore;
use rand::rngs::OsRng;
use rand::RngCore;

pub const ROOM_ID_LEN: usize = 6;
pub const MAX_ID_ATTEMPTS: usize = 5;

/// OS 난수로 6자리 대문자 16진수 코드 생성
pub fn generate_room_id() -> String {
    let mut bytes = [0u8; ROOM_ID_LEN / 2];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// 저장소에 없는 코드가 나올 때까지 재시도
pub async fn generate_unique_room_id<G>(
    store: &dyn RoomStore,
    mut generate: G,
) -> Result<String, RoomError>
where
    G: FnMut() -> String + Send,
{
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let candidate = generate();
        if store.get_room(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        tracing::debug!(room_id = %candidate, attempt, "Room id collision, retrying");
    }

    tracing::error!(attempts = MAX_ID_ATTEMPTS, "Room id generation exhausted");
    Err(RoomError::CollisionExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}
