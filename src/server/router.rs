use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use deskpilot_core_types::{DecideRequest, DecideResponse};
use deskpilot_perceiver_visual::spawn_frame_write;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use super::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/decide", post(decide))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "llm_provider": state.provider,
        "model": state.pipeline.model_name(),
    }))
}

/// Malformed bodies never reach here; axum's Json extractor rejects them
/// with a client error and no side effects.
async fn decide(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DecideRequest>,
) -> Json<DecideResponse> {
    info!(
        client = %request.client_id,
        task = %request.task,
        window = %request.state.window_title,
        history = request.history.len(),
        "decide request"
    );
    persist_debug_frame(&state, &request);
    let response = state.pipeline.decide(request).await;
    info!(
        success = response.success,
        task_completed = response.task_completed,
        action = response
            .command
            .as_ref()
            .map(|c| c.action.as_str())
            .unwrap_or(""),
        "decide response"
    );
    Json(response)
}

/// Flight recorder: keep the client's low-fidelity frame on disk, detached
/// from the request path.
fn persist_debug_frame(state: &AppState, request: &DecideRequest) {
    let Some(frame_b64) = &request.state.debug_screenshot else {
        return;
    };
    let bytes = match BASE64.decode(frame_b64) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%err, "debug frame is not valid base64");
            return;
        }
    };
    let path = state
        .screenshots_dir
        .join(sanitize(&request.client_id))
        .join(format!("{}.jpg", Uuid::new_v4()));
    spawn_frame_write(bytes, path);
}

fn sanitize(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}
