//! 방/플레이어 데이터 모델

use crate::protocol::RoomView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_IMPOSTERS: u32 = 1;
pub const MAX_IMPOSTERS: u32 = 3;

/// 라운드 내 플레이어 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Imposter,
    Crew,
}

/// 방 참가자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            role: None,
            word: None,
        }
    }
}

/// 게임 방 (외부 저장소 JSON 형식과 동일)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub locale: String,
    pub players: Vec<Player>,
    pub main_word: String,
    pub imposter_word: String,
    pub updated_at: u64,
    pub pack_id: String,
    pub imposters: u32,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

impl Room {
    /// 라운드 0, 단어 없음, 플레이어 없음 상태의 새 방
    pub fn new(id: String, locale: &str, pack_id: &str, imposters: u32, now_ms: u64) -> Self {
        Self {
            id,
            locale: locale.to_string(),
            players: Vec::new(),
            main_word: String::new(),
            imposter_word: String::new(),
            updated_at: now_ms,
            pack_id: pack_id.to_string(),
            imposters: imposters.clamp(MIN_IMPOSTERS, MAX_IMPOSTERS),
            round: 0,
            host_id: None,
        }
    }

    /// 새 플레이어를 추가하고 그 id를 반환
    pub fn add_player(&mut self, name: &str, now_ms: u64) -> String {
        let player = Player::new(name);
        let id = player.id.clone();
        self.players.push(player);
        if self.host_id.is_none() {
            self.host_id = Some(id.clone());
        }
        self.touch(now_ms);
        id
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id.as_deref() == Some(player_id)
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.updated_at = now_ms;
    }

    /// 마지막 갱신 후 TTL이 지났는지
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.updated_at) > ttl_ms
    }

    /// 특정 플레이어 시점의 응답. 다른 플레이어의 정보는 포함하지 않는다.
    pub fn project(&self, player_id: &str) -> Option<RoomView> {
        let player = self.player(player_id)?;
        Some(RoomView {
            room_id: self.id.clone(),
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            word: player.word.clone(),
            is_host: self.is_host(&player.id),
            round: self.round,
            pack_id: self.pack_id.clone(),
            imposters: self.imposters,
            players_count: self.players.len(),
        })
    }
}

/// JSON 입력을 임포스터 수로 변환. 숫자가 아니면 1, 범위는 [1, 3]
pub fn clamp_imposters(value: Option<&serde_json::Value>) -> u32 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => {
            (n.trunc() as i64).clamp(MIN_IMPOSTERS as i64, MAX_IMPOSTERS as i64) as u32
        }
        _ => MIN_IMPOSTERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room_with(names: &[&str]) -> Room {
        let mut room = Room::new("ABC123".into(), "en", "classic", 1, 1_000);
        for name in names {
            room.add_player(name, 1_000);
        }
        room
    }

    #[test]
    fn first_player_becomes_host() {
        let room = room_with(&["Ana", "Ben"]);
        let host = room.host_id.clone().unwrap();
        assert_eq!(host, room.players[0].id);
        assert!(room.is_host(&host));
        assert!(!room.is_host(&room.players[1].id));
    }

    #[test]
    fn projection_hides_other_players() {
        let mut room = room_with(&["Ana", "Ben"]);
        room.players[0].role = Some(Role::Imposter);
        room.players[0].word = Some("Desert".into());
        room.players[1].role = Some(Role::Crew);
        room.players[1].word = Some("Beach".into());
        room.round = 1;

        let ben = room.players[1].id.clone();
        let view = room.project(&ben).unwrap();
        assert_eq!(view.name, "Ben");
        assert_eq!(view.role, Some(Role::Crew));
        assert_eq!(view.word.as_deref(), Some("Beach"));
        assert!(!view.is_host);
        assert_eq!(view.players_count, 2);

        let body = serde_json::to_string(&view).unwrap();
        assert!(!body.contains("Desert"));
        assert!(!body.contains("imposter\""));
        assert!(!body.contains(&room.players[0].id));
        assert!(!body.contains("Ana"));
    }

    #[test]
    fn projection_for_unknown_player_is_none() {
        let room = room_with(&["Ana"]);
        assert!(room.project("nobody").is_none());
    }

    #[test]
    fn expiry_is_strictly_after_ttl() {
        let room = room_with(&[]);
        assert!(!room.is_expired(1_000 + 500, 500));
        assert!(room.is_expired(1_000 + 501, 500));
        assert!(!room.is_expired(0, 500));
    }

    #[test]
    fn imposters_input_is_clamped() {
        assert_eq!(clamp_imposters(None), 1);
        assert_eq!(clamp_imposters(Some(&json!(2))), 2);
        assert_eq!(clamp_imposters(Some(&json!(9))), 3);
        assert_eq!(clamp_imposters(Some(&json!(0))), 1);
        assert_eq!(clamp_imposters(Some(&json!(-4))), 1);
        assert_eq!(clamp_imposters(Some(&json!("3"))), 3);
        assert_eq!(clamp_imposters(Some(&json!("lots"))), 1);
        assert_eq!(clamp_imposters(Some(&json!(true))), 1);
        assert_eq!(clamp_imposters(Some(&json!(2.7))), 2);
    }

    #[test]
    fn room_json_uses_camel_case() {
        let room = room_with(&["Ana"]);
        let value = serde_json::to_value(&room).unwrap();
        assert!(value.get("mainWord").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("hostId").is_some());
        let back: Room = serde_json::from_value(value).unwrap();
        assert_eq!(back, room);
    }
}
