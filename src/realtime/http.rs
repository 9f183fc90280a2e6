//! 외부 pub/sub REST 엔드포인트로 발행

use super::{channel_name, NotifyError, RoomNotifier};
use crate::config::RealtimeConfig;
use crate::protocol::RoomEvent;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

pub const ROOM_UPDATED_EVENT: &str = "room-updated";

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    channel: String,
    event: &'static str,
    data: &'a RoomEvent,
}

pub struct HttpPublisher {
    client: Client,
    url: String,
    token: Option<String>,
    prefix: String,
}

impl HttpPublisher {
    pub fn new(url: &str, config: &RealtimeConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            token: config.token.clone(),
            prefix: config.channel_prefix.clone(),
        })
    }
}

#[async_trait]
impl RoomNotifier for HttpPublisher {
    async fn publish(&self, event: &RoomEvent) -> Result<(), NotifyError> {
        let body = PublishBody {
            channel: channel_name(&self.prefix, &event.room_id),
            event: ROOM_UPDATED_EVENT,
            data: event,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let status = request.send().await?.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::debug!(channel = %body.channel, "Room event published");
        Ok(())
    }
}
