//! Chatbot management routes: analytics and context maintenance.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use database::bot_interaction::{self, AnalyticsSummary};

use crate::error::Result;
use crate::state::AppState;

/// Aggregated automated-handling statistics.
pub async fn analytics(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>> {
    let summary = bot_interaction::analytics(state.db.pool()).await?;
    Ok(Json(summary))
}

/// Drop the conversational context for one customer.
pub async fn clear_context(
    State(state): State<AppState>,
    Path(customer_key): Path<String>,
) -> Json<Value> {
    state.engine.contexts().clear(&customer_key).await;
    info!(customer = %customer_key, "cleared conversation context");
    Json(json!({ "message": format!("Context cleared for {customer_key}") }))
}

/// Sweep expired contexts on demand.
pub async fn cleanup_contexts(State(state): State<AppState>) -> Json<Value> {
    let removed = state.engine.contexts().sweep_expired().await;
    Json(json!({ "removed": removed }))
}
