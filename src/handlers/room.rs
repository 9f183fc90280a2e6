//! 방 액션 핸들러 (`POST /api/room`)

use crate::coordinator::RoomAction;
use crate::error::RoomError;
use crate::protocol::{ActionRequest, ActionResponse, ErrorResponse};
use crate::rate_limit::{client_identifier, RateLimitDecision};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// 액션 요청 처리: 요청 제한 → 파싱 → 코디네이터 실행
pub async fn handle_room_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Response {
    let client = client_identifier(&headers);
    let decision = state.limiter.check(&client);

    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs(state.limiter.now_ms());
        tracing::warn!(client = %client, retry_after_secs, "Room action rate limited");
        return RoomError::RateLimited {
            limit: decision.limit,
            reset_at_ms: decision.reset_at_ms,
            retry_after_secs,
        }
        .into_response();
    }

    let result = match body {
        Ok(Json(request)) => match RoomAction::try_from(request) {
            Ok(action) => {
                let name = action.name();
                tracing::debug!(client = %client, action = name, "Handling room action");
                state.coordinator.handle(action).await
            }
            Err(e) => Err(e),
        },
        Err(rejection) => Err(RoomError::Validation(rejection.body_text())),
    };

    let mut response = match result {
        Ok(room) => (StatusCode::OK, Json(ActionResponse { room })).into_response(),
        Err(e) => e.into_response(),
    };
    apply_limit_headers(response.headers_mut(), &decision);
    response
}

fn apply_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    set_header(headers, LIMIT_HEADER, decision.limit as u64);
    set_header(headers, REMAINING_HEADER, decision.remaining as u64);
    set_header(headers, RESET_HEADER, reset_secs(decision.reset_at_ms));
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: u64) {
    headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
}

fn reset_secs(reset_at_ms: u64) -> u64 {
    reset_at_ms.div_ceil(1000)
}

impl IntoResponse for RoomError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let RoomError::RateLimited {
            limit,
            reset_at_ms,
            retry_after_secs,
        } = self
        {
            let body = ErrorResponse {
                limit: Some(limit),
                remaining: Some(0),
                reset: Some(reset_secs(reset_at_ms)),
                retry_after: Some(retry_after_secs),
                ..ErrorResponse::new(self.to_string())
            };
            let mut response = (status, Json(body)).into_response();
            let headers = response.headers_mut();
            apply_limit_headers(
                headers,
                &RateLimitDecision {
                    allowed: false,
                    limit,
                    remaining: 0,
                    reset_at_ms,
                },
            );
            set_header(headers, "retry-after", retry_after_secs);
            return response;
        }

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Room action failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
