//! HTTP server: WebSocket endpoint, state API, and static assets.

use crate::actor::{EngineHandle, spawn_engine};
use crate::config::ServerConfig;
use crate::engine::GameEngine;
use crate::error::ServerError;
use crate::protocol::BoardUpdate;
use crate::ws::ws_handler;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// State shared by request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the engine task.
    pub engine: EngineHandle,
}

/// Builds the router.
///
/// - `GET /ws` upgrades to the event channel
/// - `GET /api/state` returns the current board
/// - `GET /health` returns `ok`
/// - anything else is served from `static_dir`
pub fn build_router(engine: EngineHandle, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/state", get(get_state))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

async fn get_state(State(state): State<AppState>) -> Result<Json<BoardUpdate>, ServerError> {
    let snapshot = state.engine.snapshot().await?;
    Ok(Json(BoardUpdate::from(&snapshot)))
}

async fn health() -> &'static str {
    "ok"
}

/// Starts the engine and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or serving fails.
#[instrument(skip(config), fields(addr = %config.bind_addr()))]
pub async fn start_server(config: &ServerConfig) -> Result<(), ServerError> {
    let engine = spawn_engine(
        GameEngine::new(*config.notify_rejections()),
        *config.channel_capacity(),
    );
    let router = build_router(engine, config.static_dir());

    let listener = TcpListener::bind(config.bind_addr()).await?;

    info!(
        static_dir = %config.static_dir().display(),
        "Server listening on http://{}",
        config.bind_addr()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
