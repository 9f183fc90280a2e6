//! 핸들러 모듈

pub mod connection;
pub mod room;

pub use connection::*;
pub use room::*;

use crate::packs;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// 라우터 설정
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/room", post(handle_room_action))
        .route("/ws/:room_id", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>Imposter Room Server</h1><p>Room actions: POST /api/room</p>")
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let realtime = if state.hub.is_some() { "local" } else { "http" };
    Json(serde_json::json!({
        "status": "ok",
        "server": "imposter-room-server",
        "store": state.coordinator.store().backend(),
        "realtime": realtime,
        "subscriptions": state.hub.as_ref().map(|hub| hub.channel_count()),
        "packs": packs::pack_ids().collect::<Vec<_>>(),
        "timestamp": state.limiter.now_ms() / 1000,
    }))
}
