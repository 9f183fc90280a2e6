//! 방 액션 오류 정의

use crate::store::StoreError;
use axum::http::StatusCode;
use thiserror::Error;

/// 방 액션 처리 중 발생하는 오류
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Permission(String),

    #[error("Too many requests")]
    RateLimited {
        limit: u32,
        reset_at_ms: u64,
        retry_after_secs: u64,
    },

    #[error("Failed to allocate a room id after {attempts} attempts")]
    CollisionExhausted { attempts: usize },

    #[error("Room store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),
}

impl RoomError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Permission(_) => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CollisionExhausted { .. } | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn room_not_found() -> Self {
        Self::NotFound("Room not found".to_string())
    }

    pub fn player_not_found() -> Self {
        Self::NotFound("Player not found".to_string())
    }
}
