//! 방 액션 처리 (생성, 참가, 다음 라운드, 동기화)

use crate::clock::Clock;
use crate::error::RoomError;
use crate::packs;
use crate::protocol::{ActionRequest, RoomEvent, RoomView};
use crate::realtime::{notify_in_background, RoomNotifier};
use crate::room::{
    assign_roles, clamp_imposters, generate_room_id, generate_unique_room_id, Room,
};
use crate::store::{normalize_room_id, RoomStore};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub const DEFAULT_LOCALE: &str = "en";

/// 파싱된 방 액션
#[derive(Debug, Clone)]
pub enum RoomAction {
    Create {
        name: Option<String>,
        locale: Option<String>,
        pack_id: Option<String>,
        imposters: Option<serde_json::Value>,
    },
    Join {
        room_id: Option<String>,
        name: Option<String>,
    },
    NextRound {
        room_id: Option<String>,
        player_id: Option<String>,
    },
    Sync {
        room_id: Option<String>,
        player_id: Option<String>,
    },
}

impl RoomAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Join { .. } => "join",
            Self::NextRound { .. } => "nextRound",
            Self::Sync { .. } => "sync",
        }
    }
}

impl TryFrom<ActionRequest> for RoomAction {
    type Error = RoomError;

    fn try_from(req: ActionRequest) -> Result<Self, Self::Error> {
        match req.action.as_str() {
            "create" => Ok(Self::Create {
                name: req.name,
                locale: req.locale,
                pack_id: req.pack_id,
                imposters: req.imposters,
            }),
            "join" => Ok(Self::Join {
                room_id: req.room_id,
                name: req.name,
            }),
            "nextRound" => Ok(Self::NextRound {
                room_id: req.room_id,
                player_id: req.player_id,
            }),
            "sync" => Ok(Self::Sync {
                room_id: req.room_id,
                player_id: req.player_id,
            }),
            other => Err(RoomError::UnsupportedAction(other.to_string())),
        }
    }
}

/// 방 상태 전이를 담당하는 코디네이터.
///
/// 같은 방에 대한 변경 액션은 인스턴스 내에서 방 단위 뮤텍스로 직렬화된다.
pub struct RoomCoordinator {
    store: Arc<dyn RoomStore>,
    notifier: Arc<dyn RoomNotifier>,
    clock: Arc<dyn Clock>,
    room_locks: DashMap<String, Arc<Mutex<()>>>,
}

/// 방 잠금. 해제 시 대기자가 없으면 잠금 항목도 제거
struct RoomLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoomLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl RoomCoordinator {
    pub fn new(
        store: Arc<dyn RoomStore>,
        notifier: Arc<dyn RoomNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            room_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn RoomStore> {
        &self.store
    }

    pub async fn handle(&self, action: RoomAction) -> Result<RoomView, RoomError> {
        match action {
            RoomAction::Create {
                name,
                locale,
                pack_id,
                imposters,
            } => {
                self.create(
                    name.as_deref(),
                    locale.as_deref(),
                    pack_id.as_deref(),
                    imposters.as_ref(),
                )
                .await
            }
            RoomAction::Join { room_id, name } => {
                self.join(room_id.as_deref(), name.as_deref()).await
            }
            RoomAction::NextRound { room_id, player_id } => {
                self.next_round(room_id.as_deref(), player_id.as_deref())
                    .await
            }
            RoomAction::Sync { room_id, player_id } => {
                self.sync(room_id.as_deref(), player_id.as_deref()).await
            }
        }
    }

    /// 새 방을 만들고 호출자를 호스트로 추가
    pub async fn create(
        &self,
        name: Option<&str>,
        locale: Option<&str>,
        pack_id: Option<&str>,
        imposters: Option<&serde_json::Value>,
    ) -> Result<RoomView, RoomError> {
        let name = required(name, "Name is required")?;
        let locale = locale
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCALE);
        let pack_id = packs::normalize_pack_id(pack_id);
        let imposters = clamp_imposters(imposters);

        let room_id = generate_unique_room_id(self.store.as_ref(), generate_room_id).await?;

        let now = self.clock.now_ms();
        let mut room = Room::new(room_id, locale, pack_id, imposters, now);
        let player_id = room.add_player(name, now);

        self.store.save_room(&room).await?;
        self.notify(&room);

        tracing::info!(
            room_id = %room.id,
            player_id = %player_id,
            pack_id = %room.pack_id,
            imposters = room.imposters,
            "Room created"
        );
        view(&room, &player_id)
    }

    /// 기존 방에 새 플레이어로 참가
    pub async fn join(
        &self,
        room_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<RoomView, RoomError> {
        let room_id = normalize_room_id(required(room_id, "Room code is required")?);
        let name = required(name, "Name is required")?;

        let _lock = self.lock_room(&room_id).await;
        let mut room = self.load(&room_id).await?;

        let player_id = room.add_player(name, self.clock.now_ms());
        self.store.save_room(&room).await?;
        self.notify(&room);

        tracing::info!(
            room_id = %room.id,
            player_id = %player_id,
            players = room.players.len(),
            "Player joined room"
        );
        view(&room, &player_id)
    }

    /// 호스트 전용: 새 단어 쌍을 뽑고 모든 플레이어의 역할을 다시 배정
    pub async fn next_round(
        &self,
        room_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<RoomView, RoomError> {
        let room_id = normalize_room_id(required(room_id, "Room code is required")?);
        let player_id = required(player_id, "Player id is required")?;

        let _lock = self.lock_room(&room_id).await;
        let mut room = self.load(&room_id).await?;

        if !room.is_host(player_id) {
            tracing::warn!(room_id = %room.id, player_id = %player_id, "Non-host tried to start a round");
            return Err(RoomError::Permission(
                "Only the host can start the next round".to_string(),
            ));
        }

        let pair = packs::random_pair(&room.pack_id);
        room.main_word = pair.main.to_string();
        room.imposter_word = pair.imposter.to_string();
        room.round += 1;

        let now = self.clock.now_ms();
        room.touch(now);
        assign_roles(&mut room, &mut rand::thread_rng(), now);

        self.store.save_room(&room).await?;
        self.notify(&room);

        tracing::info!(
            room_id = %room.id,
            round = room.round,
            players = room.players.len(),
            "Round started"
        );
        view(&room, player_id)
    }

    /// 읽기 전용: 플레이어 시점의 현재 방 상태
    pub async fn sync(
        &self,
        room_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<RoomView, RoomError> {
        let room_id = required(room_id, "Room code is required")?;
        let player_id = required(player_id, "Player id is required")?;

        let room = self.load(room_id).await?;
        view(&room, player_id)
    }

    async fn load(&self, room_id: &str) -> Result<Room, RoomError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or_else(RoomError::room_not_found)
    }

    async fn lock_room(&self, room_id: &str) -> RoomLock<'_> {
        let lock = self
            .room_locks
            .entry(room_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        RoomLock {
            locks: &self.room_locks,
            key: room_id.to_string(),
            guard: Some(guard),
        }
    }

    fn notify(&self, room: &Room) {
        let event = RoomEvent {
            room_id: room.id.clone(),
            updated_at: room.updated_at,
            round: room.round,
            players_count: room.players.len(),
        };
        notify_in_background(self.notifier.clone(), event);
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, RoomError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RoomError::Validation(message.to_string()))
}

fn view(room: &Room, player_id: &str) -> Result<RoomView, RoomError> {
    room.project(player_id)
        .ok_or_else(RoomError::player_not_found)
}
