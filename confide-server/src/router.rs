use crate::config::ServerConfig;
use crate::room::RoomRegistry;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use confide_core::utils::SIGNALING_PATH;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct AppState {
    pub signaling: SignalingService,
    pub registry: RoomRegistry,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let signaling = SignalingService::new();
        let registry = RoomRegistry::new(Arc::new(signaling.clone()), config.room_buffer);
        Self {
            signaling,
            registry,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(SIGNALING_PATH, get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind` and serves until the process is stopped.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    serve_on(listener, Arc::new(AppState::new(&config))).await
}

pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Signaling server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Signaling server stopped")
}
