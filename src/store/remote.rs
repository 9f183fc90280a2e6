//! HTTP 기반 외부 방 저장소 (다중 인스턴스 배포용)
//!
//! `{base_url}/rooms/{ID}` 리소스에 대해 GET/PUT/DELETE를 수행한다.
//! 404는 "없음"으로, 그 외 2xx가 아닌 응답은 저장소 오류로 처리한다.

use super::{normalize_room_id, RoomStore, StoreError};
use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::room::Room;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;

pub struct RemoteRoomStore {
    client: Client,
    base_url: String,
    token: Option<String>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
}

impl RemoteRoomStore {
    pub fn new(
        base_url: &str,
        config: &StoreConfig,
        clock: Arc<dyn Clock>,
        ttl_ms: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            clock,
            ttl_ms,
        })
    }

    fn room_url(&self, id: &str) -> String {
        room_url(&self.base_url, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn room_url(base_url: &str, id: &str) -> String {
    format!("{}/rooms/{}", base_url, normalize_room_id(id))
}

#[async_trait]
impl RoomStore for RemoteRoomStore {
    async fn get_room(&self, id: &str) -> Result<Option<Room>, StoreError> {
        let response = self
            .authorize(self.client.get(self.room_url(id)))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(room_id = %id, status = status.as_u16(), "Room store GET failed");
            return Err(StoreError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let room: Room = serde_json::from_slice(&body)?;

        if room.is_expired(self.clock.now_ms(), self.ttl_ms) {
            if let Err(e) = self.delete_room(&room.id).await {
                tracing::warn!(room_id = %room.id, error = %e, "Failed to drop expired room");
            }
            return Ok(None);
        }

        Ok(Some(room))
    }

    async fn save_room(&self, room: &Room) -> Result<(), StoreError> {
        let mut record = room.clone();
        record.id = normalize_room_id(&room.id);

        let response = self
            .authorize(self.client.put(self.room_url(&record.id)))
            .json(&record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(room_id = %record.id, status = status.as_u16(), "Room store PUT failed");
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn delete_room(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.delete(self.room_url(id)))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        tracing::warn!(room_id = %id, status = status.as_u16(), "Room store DELETE failed");
        Err(StoreError::Status(status.as_u16()))
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use axum::extract::{Path, State};
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;
    use axum::Router;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

    const TTL: u64 = 24 * 60 * 60 * 1000;

    /// 인프로세스 KV 서버: 방 JSON을 보관하고 강제 실패 상태를 흉내낸다
    #[derive(Default)]
    struct KvServer {
        records: DashMap<String, String>,
        /// 0이 아니면 모든 요청에 이 상태로 응답
        fail_with: AtomicU16,
        deletes: AtomicUsize,
    }

    impl KvServer {
        fn forced_failure(&self) -> Option<HttpStatus> {
            match self.fail_with.load(Ordering::SeqCst) {
                0 => None,
                code => HttpStatus::from_u16(code).ok(),
            }
        }
    }

    async fn kv_get(Path(id): Path<String>, State(kv): State<Arc<KvServer>>) -> (HttpStatus, String) {
        if let Some(status) = kv.forced_failure() {
            return (status, String::new());
        }
        match kv.records.get(&id) {
            Some(body) => (HttpStatus::OK, body.clone()),
            None => (HttpStatus::NOT_FOUND, String::new()),
        }
    }

    async fn kv_put(
        Path(id): Path<String>,
        State(kv): State<Arc<KvServer>>,
        body: String,
    ) -> HttpStatus {
        if let Some(status) = kv.forced_failure() {
            return status;
        }
        kv.records.insert(id, body);
        HttpStatus::NO_CONTENT
    }

    async fn kv_delete(Path(id): Path<String>, State(kv): State<Arc<KvServer>>) -> HttpStatus {
        if let Some(status) = kv.forced_failure() {
            return status;
        }
        kv.deletes.fetch_add(1, Ordering::SeqCst);
        match kv.records.remove(&id) {
            Some(_) => HttpStatus::NO_CONTENT,
            None => HttpStatus::NOT_FOUND,
        }
    }

    async fn serve_kv() -> (Arc<KvServer>, String) {
        let kv = Arc::new(KvServer::default());
        let app = Router::new()
            .route("/rooms/:id", get(kv_get).put(kv_put).delete(kv_delete))
            .with_state(kv.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (kv, format!("http://{addr}"))
    }

    async fn connected_store() -> (Arc<KvServer>, Arc<ManualClock>, RemoteRoomStore) {
        let (kv, base_url) = serve_kv().await;
        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = StoreConfig {
            url: Some(base_url.clone()),
            token: Some("secret".into()),
            timeout_ms: 5000,
        };
        let store = RemoteRoomStore::new(&base_url, &config, clock.clone(), TTL).unwrap();
        (kv, clock, store)
    }

    fn room(id: &str, now: u64) -> Room {
        let mut room = Room::new(id.to_string(), "en", "classic", 1, now);
        room.add_player("Ana", now);
        room
    }

    #[tokio::test]
    async fn missing_room_reads_as_absent() {
        let (_kv, _clock, store) = connected_store().await;
        assert!(store.get_room("AB12CD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_room_is_read_back_under_normalized_id() {
        let (kv, clock, store) = connected_store().await;
        store.save_room(&room("ab12cd", clock.now_ms())).await.unwrap();
        assert!(kv.records.contains_key("AB12CD"));

        let found = store.get_room(" ab12cd").await.unwrap().unwrap();
        assert_eq!(found.id, "AB12CD");
        assert_eq!(found.players[0].name, "Ana");
    }

    #[tokio::test]
    async fn non_success_responses_surface_as_status_errors() {
        let (kv, clock, store) = connected_store().await;

        kv.fail_with.store(502, Ordering::SeqCst);
        assert!(matches!(
            store.get_room("AB12CD").await,
            Err(StoreError::Status(502))
        ));

        kv.fail_with.store(500, Ordering::SeqCst);
        assert!(matches!(
            store.save_room(&room("AB12CD", clock.now_ms())).await,
            Err(StoreError::Status(500))
        ));
        assert!(matches!(
            store.delete_room("AB12CD").await,
            Err(StoreError::Status(500))
        ));
    }

    #[tokio::test]
    async fn deleting_a_missing_room_succeeds() {
        let (kv, _clock, store) = connected_store().await;
        store.delete_room("AB12CD").await.unwrap();
        assert_eq!(kv.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_record_is_a_decode_error() {
        let (kv, _clock, store) = connected_store().await;
        kv.records.insert("AB12CD".into(), "not json".into());
        assert!(matches!(
            store.get_room("AB12CD").await,
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn expired_record_reads_as_absent_and_is_deleted() {
        let (kv, clock, store) = connected_store().await;
        store.save_room(&room("AB12CD", clock.now_ms())).await.unwrap();

        clock.advance(TTL);
        assert!(store.get_room("AB12CD").await.unwrap().is_some());
        assert_eq!(kv.deletes.load(Ordering::SeqCst), 0);

        clock.advance(1);
        assert!(store.get_room("AB12CD").await.unwrap().is_none());
        assert_eq!(kv.deletes.load(Ordering::SeqCst), 1);
        assert!(kv.records.is_empty());
    }

    #[test]
    fn resource_path_uses_normalized_id() {
        assert_eq!(
            room_url("https://kv.example.com/v1", " ab12cd "),
            "https://kv.example.com/v1/rooms/AB12CD"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let store = RemoteRoomStore::new(
            "https://kv.example.com/",
            &crate::config::Config::default().store,
            Arc::new(crate::clock::SystemClock),
            1000,
        )
        .unwrap();
        assert_eq!(store.room_url("abc123"), "https://kv.example.com/rooms/ABC123");
        assert_eq!(store.backend(), "remote");
    }
}
