//! 실시간 구독 연결 핸들러 (`GET /ws/:room_id`)

use crate::error::RoomError;
use crate::protocol::{ClientMessage, RoomEvent, ServerMessage};
use crate::realtime::LocalHub;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match subscription_hub(&state, &room_id).await {
        Ok(hub) => ws.on_upgrade(move |socket| handle_socket(socket, hub, room_id)),
        Err(response) => response,
    }
}

/// 살아 있는 방에만 구독 허용
async fn subscription_hub(state: &AppState, room_id: &str) -> Result<Arc<LocalHub>, Response> {
    let Some(hub) = state.hub.clone() else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(crate::protocol::ErrorResponse::new("Realtime hub disabled")),
        )
            .into_response());
    };

    match state.coordinator.store().get_room(room_id).await {
        Ok(Some(_)) => Ok(hub),
        Ok(None) => Err(RoomError::room_not_found().into_response()),
        Err(e) => Err(RoomError::Store(e).into_response()),
    }
}

async fn handle_socket(socket: WebSocket, hub: Arc<LocalHub>, room_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let (channel, events) = hub.subscribe(&room_id);
    let _ = tx.send(ServerMessage::Subscribed {
        channel: channel.clone(),
    });
    tracing::info!(channel = %channel, "Realtime subscriber connected");

    // 송신 태스크
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // 방 이벤트 전달 태스크
    let forward_task = tokio::spawn(forward_events(events, tx.clone()));

    // 수신 처리
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Ok(ClientMessage::Heartbeat) = serde_json::from_str::<ClientMessage>(&text) {
                    let _ = tx.send(ServerMessage::HeartbeatAck);
                }
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    forward_task.abort();
    send_task.abort();
    // 수신자가 드롭될 때까지 기다린 뒤 채널 정리
    let _ = forward_task.await;
    hub.unsubscribe(&channel);
    tracing::info!(channel = %channel, "Realtime subscriber disconnected");
}

async fn forward_events(
    mut events: broadcast::Receiver<RoomEvent>,
    tx: mpsc::UnboundedSender<ServerMessage>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if tx.send(ServerMessage::RoomUpdated(event)).is_err() {
                    break;
                }
            }
            // 밀린 이벤트는 버려도 됨: 클라이언트는 다음 이벤트에서 다시 sync
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Realtime subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
