//! Health check route.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness and a couple of cheap gauges.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "connected_agents": state.notifier.connection_count().await,
    }))
}
