//! Provider webhook handlers.
//!
//! Each handler normalizes its provider's wire format, applies the
//! allow-list and hands the canonical event to the shared dispatch
//! pipeline. Malformed payloads acknowledge with a structured drop reason
//! instead of an error, so one broken event never disturbs other customers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use responder_core::InboundEvent;

use crate::dispatch::{self, InboundDisposition};
use crate::error::{ApiError, Result};
use crate::normalize::{self, EvolutionWebhook, N8nWebhook, TwilioForm, WahaWebhook};
use crate::state::AppState;

/// Twilio form-encoded webhook.
pub async fn twilio(
    State(state): State<AppState>,
    Form(form): Form<TwilioForm>,
) -> Result<Json<Value>> {
    match normalize::from_twilio(form) {
        Ok(event) => dispatch_event(&state, event).await,
        Err(reason) => Ok(dropped(reason)),
    }
}

/// Evolution API JSON webhook.
pub async fn evolution(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    let webhook: EvolutionWebhook = match serde_json::from_value(payload) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!(error = %e, "malformed Evolution payload");
            return Ok(dropped("malformed payload"));
        }
    };

    match normalize::from_evolution(webhook) {
        Ok(event) => dispatch_event(&state, event).await,
        Err(reason) => Ok(dropped(reason)),
    }
}

/// WAHA JSON webhook.
pub async fn waha(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    let webhook: WahaWebhook = match serde_json::from_value(payload) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!(error = %e, "malformed WAHA payload");
            return Ok(dropped("malformed payload"));
        }
    };

    match normalize::from_waha(webhook) {
        Ok(event) => dispatch_event(&state, event).await,
        Err(reason) => Ok(dropped(reason)),
    }
}

/// n8n workflow webhook, authenticated with a shared key.
pub async fn n8n(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    verify_n8n_key(&state, &headers)?;

    let webhook: N8nWebhook = match serde_json::from_value(payload) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!(error = %e, "malformed n8n payload");
            return Ok(dropped("malformed payload"));
        }
    };

    match normalize::from_n8n(webhook) {
        Ok(event) => dispatch_event(&state, event).await,
        Err(reason) => Ok(dropped(reason)),
    }
}

/// Check the n8n shared key (`x-n8n-api-key` header or bearer token).
/// With no key configured, requests pass with a logged warning.
fn verify_n8n_key(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.config.n8n_api_key.as_deref() else {
        warn!("no n8n API key configured, allowing all requests");
        return Ok(());
    };

    let presented = headers
        .get("x-n8n-api-key")
        .or_else(|| headers.get("authorization"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match presented {
        Some(key) if key == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("invalid n8n credentials".into())),
    }
}

/// Run the shared pipeline and shape the acknowledgement.
async fn dispatch_event(state: &AppState, event: InboundEvent) -> Result<Json<Value>> {
    if !normalize::is_authorized(&event.customer_key, &state.config.authorized_numbers) {
        info!(customer = %event.customer_key, "sender not on the allow-list");
        return Ok(dropped("unauthorized number"));
    }

    let disposition = dispatch::handle_inbound(state, event).await?;
    Ok(Json(match disposition {
        InboundDisposition::Ignored { reason } => json!({
            "status": "ignored",
            "reason": reason,
        }),
        InboundDisposition::Replied {
            conversation_id,
            text,
            tier,
        } => json!({
            "status": "bot_response",
            "conversation_id": conversation_id,
            "response": text,
            "bot_service": tier,
        }),
        InboundDisposition::Escalated {
            conversation_id,
            reason,
            notice,
        } => json!({
            "status": "escalated_to_agent",
            "conversation_id": conversation_id,
            "reason": reason,
            "response": notice,
        }),
    }))
}

fn dropped(reason: &str) -> Json<Value> {
    Json(json!({
        "status": "ignored",
        "reason": reason,
    }))
}
