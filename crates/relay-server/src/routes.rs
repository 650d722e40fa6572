//! Routes
//!
//! HTTP router: health check plus the two WebSocket endpoints.

use crate::state::AppState;
use crate::ws;
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use relay_hub::{CloseReport, HubConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws/echo", get(echo_handler))
        .route("/ws/chat", get(chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn echo_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let ws = apply_subprotocol(ws, state.echo_hub().config());
    ws.on_upgrade(move |socket| handle_echo_socket(state, socket))
}

async fn chat_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let ws = apply_subprotocol(ws, state.chat_hub().config());
    ws.on_upgrade(move |socket| handle_chat_socket(state, socket))
}

async fn handle_echo_socket(state: AppState, socket: WebSocket) {
    let (reader, writer) = ws::split(socket);
    match state.echo_hub().accept(reader, Box::new(writer), ()).await {
        Ok(report) => log_report("echo", &report),
        Err(fault) => tracing::warn!(endpoint = "echo", error = %fault, "connection rejected"),
    }
}

async fn handle_chat_socket(state: AppState, socket: WebSocket) {
    let (reader, writer) = ws::split(socket);
    let label = next_guest_label();
    match state.chat_hub().accept(reader, Box::new(writer), label).await {
        Ok(report) => log_report("chat", &report),
        Err(fault) => tracing::warn!(endpoint = "chat", error = %fault, "connection rejected"),
    }
}

fn apply_subprotocol(ws: WebSocketUpgrade, config: &HubConfig) -> WebSocketUpgrade {
    match &config.subprotocol {
        Some(name) => ws.protocols([name.clone()]),
        None => ws,
    }
}

/// The hub reports one terminal event per connection; logging it is this
/// host's policy.
fn log_report(endpoint: &str, report: &CloseReport) {
    if report.is_clean() {
        tracing::info!(endpoint, %report, "connection finished");
    } else {
        tracing::warn!(endpoint, %report, "connection finished");
    }
}

fn next_guest_label() -> String {
    static GUEST_SEQ: AtomicU64 = AtomicU64::new(1);
    format!("guest-{}", GUEST_SEQ.fetch_add(1, Ordering::Relaxed))
}
