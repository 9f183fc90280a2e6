//! 클라이언트-서버 메시지 프로토콜 정의

use crate::room::Role;
use serde::{Deserialize, Serialize};

/// 클라이언트 → 서버 액션 요청 (`POST /api/room`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    pub locale: Option<String>,
    pub name: Option<String>,
    pub pack_id: Option<String>,
    /// 숫자 또는 문자열을 허용하고 서버에서 보정
    pub imposters: Option<serde_json::Value>,
    pub room_id: Option<String>,
    pub player_id: Option<String>,
}

/// 특정 플레이어에게 보이는 방 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: String,
    pub player_id: String,
    pub name: String,
    pub role: Option<Role>,
    pub word: Option<String>,
    pub is_host: bool,
    pub round: u32,
    pub pack_id: String,
    pub imposters: u32,
    pub players_count: usize,
}

/// 성공 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub room: RoomView,
}

/// 실패 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    /// 윈도우 리셋 시각 (에포크 초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            limit: None,
            remaining: None,
            reset: None,
            retry_after: None,
        }
    }
}

/// 방 변경 알림 페이로드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    pub room_id: String,
    pub updated_at: u64,
    pub round: u32,
    pub players_count: usize,
}

/// 실시간 구독자 → 서버 메시지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    Heartbeat,
}

/// 서버 → 실시간 구독자 메시지
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    Subscribed { channel: String },
    RoomUpdated(RoomEvent),
    HeartbeatAck,
}
