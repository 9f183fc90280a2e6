//! 임포스터 게임 방 코디네이터 서버

mod clock;
mod config;
mod coordinator;
mod error;
mod handlers;
mod packs;
mod protocol;
mod rate_limit;
mod realtime;
mod room;
mod state;
mod store;
mod tasks;

use anyhow::Context;
use clock::SystemClock;
use config::Config;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = format!("{}:{}", config.host, config.port);

    // 저장소, 알림, 요청 제한 구성 + 정리 스케줄러 시작
    let (state, background_tasks) = AppState::build(config, Arc::new(SystemClock))?;
    let app = handlers::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Imposter room server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("Room actions: http://{}/api/room", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    for task in background_tasks {
        task.shutdown();
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
