//! HTTP transport: `POST /mcp` (single request, single response) and
//! `GET /health`. No server push exists over HTTP, so `*_list_changed`
//! notifications are dropped for HTTP-only agents; `games.tools` is the
//! documented polling alternative (§4.1, §9 "Dynamically growing tool
//! surface").

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use gabs_protocol::JsonRpcRequest;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::dispatch;
use crate::registries::Registries;

#[derive(Clone)]
struct HttpState {
    registries: Arc<Registries>,
    started_at: Instant,
    live_games: Arc<dyn Fn() -> usize + Send + Sync>,
}

#[derive(Serialize)]
struct HealthDocument {
    status: &'static str,
    #[serde(rename = "liveGames")]
    live_games: usize,
    #[serde(rename = "uptimeSecs")]
    uptime_secs: u64,
}

/// Build the router. `live_games` is queried fresh on every `/health` call
/// rather than cached, since a game may die between requests.
pub fn router(registries: Arc<Registries>, live_games: Arc<dyn Fn() -> usize + Send + Sync>) -> Router {
    let state = HttpState {
        registries,
        started_at: Instant::now(),
        live_games,
    };
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_mcp(State(state): State<HttpState>, Json(request): Json<JsonRpcRequest>) -> Json<Value> {
    let response = dispatch(&state.registries, request).await;
    Json(serde_json::to_value(response).expect("JsonRpcResponse always serializes"))
}

async fn handle_health(State(state): State<HttpState>) -> Json<HealthDocument> {
    Json(HealthDocument {
        status: "ok",
        live_games: (state.live_games)(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
