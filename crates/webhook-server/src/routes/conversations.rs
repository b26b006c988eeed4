//! Agent-facing conversation routes.
//!
//! Session issuance lives outside this service; mutating routes carry the
//! acting agent's id and role in the request body, put there by the
//! authenticating proxy in front of this server.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use database::models::MessageKind;
use database::{conversation, message, Conversation, ConversationStatus, Message};
use engine::notices;

use crate::error::{ApiError, Result};
use crate::notifier::LedgerEvent;
use crate::state::AppState;

/// The acting agent, stamped into the body by the auth proxy.
#[derive(Debug, Deserialize)]
pub struct Actor {
    pub agent_id: i64,
    #[serde(default)]
    pub role: Option<String>,
}

impl Actor {
    fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    /// Admins act anywhere; others only on their own conversations or
    /// unassigned ones.
    fn may_act_on(&self, conversation: &Conversation) -> bool {
        self.is_admin()
            || conversation.assigned_agent_id.is_none()
            || conversation.assigned_agent_id == Some(self.agent_id)
    }
}

/// List all conversations.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Conversation>>> {
    let conversations = conversation::list(state.db.pool()).await?;
    Ok(Json(conversations))
}

/// List the messages of a conversation.
pub async fn messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Message>>> {
    // Surface a 404 for unknown conversations instead of an empty list.
    conversation::get(state.db.pool(), id).await?;
    let messages = message::list(state.db.pool(), id).await?;
    Ok(Json(messages))
}

/// Request body for an agent reply.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(flatten)]
    pub actor: Actor,
    pub message: String,
}

/// Agent reply: append, broadcast and send directly.
///
/// Agent-authored replies bypass the outbound gate and the human-like
/// delay entirely.
pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<Value>> {
    let pool = state.db.pool();
    let conv = conversation::get(pool, id).await?;
    if conv.status == ConversationStatus::Closed {
        return Err(ApiError::Database(
            database::DatabaseError::AlreadyClosed { id },
        ));
    }
    if !request.actor.may_act_on(&conv) {
        return Err(ApiError::Forbidden(
            "conversation is assigned to another agent".into(),
        ));
    }

    // Answering an unassigned conversation claims it.
    let conv = if conv.assigned_agent_id.is_none() {
        conversation::assign(pool, id, request.actor.agent_id, false).await?
    } else {
        conv
    };

    let stored = message::append(pool, conv.id, MessageKind::Agent, &request.message, None).await?;

    state
        .notifier
        .broadcast(&LedgerEvent::AgentMessage {
            id: stored.id,
            conversation_id: conv.id,
            content: request.message.clone(),
            agent_id: request.actor.agent_id,
            timestamp: stored.created_at.clone(),
        })
        .await;

    // Direct send; the recorded message stands even if delivery fails.
    if let Err(e) = state
        .sender
        .send_text(&conv.customer_number, &request.message)
        .await
    {
        warn!(conversation = conv.id, error = %e, "agent reply send failed");
    }

    Ok(Json(json!({ "msg": "Message sent successfully" })))
}

/// Close a conversation. Closing an already-closed conversation is a
/// conflict, never a silent success.
pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(actor): Json<Actor>,
) -> Result<Json<Value>> {
    let pool = state.db.pool();
    let conv = conversation::get(pool, id).await?;
    if !actor.may_act_on(&conv) {
        return Err(ApiError::Forbidden(
            "conversation is assigned to another agent".into(),
        ));
    }

    let closed = conversation::close(pool, id).await?;

    let display_name = closed
        .display_name
        .clone()
        .unwrap_or_else(|| "Cliente".to_string());
    let farewell = notices::closing_notice(&display_name);
    message::append(pool, id, MessageKind::System, &farewell, None).await?;

    state
        .notifier
        .broadcast(&LedgerEvent::ConversationClosed {
            conversation_id: id,
            customer_name: closed.display_name.clone(),
            closed_by: actor.agent_id,
        })
        .await;

    if let Err(e) = state
        .sender
        .send_text(&closed.customer_number, &farewell)
        .await
    {
        warn!(conversation = id, error = %e, "closing notice send failed");
    }

    info!(conversation = id, agent = actor.agent_id, "conversation closed");
    Ok(Json(json!({ "detail": "Conversation closed successfully" })))
}

/// Assign the acting agent to a conversation. Reassignment of an
/// already-assigned conversation requires the admin role.
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(actor): Json<Actor>,
) -> Result<Json<Conversation>> {
    let conv =
        conversation::assign(state.db.pool(), id, actor.agent_id, actor.is_admin()).await?;
    Ok(Json(conv))
}

/// Request body for an explicit status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(flatten)]
    pub actor: Actor,
    pub status: String,
}

/// Set a conversation's status explicitly.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Value>> {
    let new_status = ConversationStatus::parse(&request.status).ok_or_else(|| {
        ApiError::Database(database::DatabaseError::InvalidStatus(
            request.status.clone(),
        ))
    })?;

    let pool = state.db.pool();
    let conv = conversation::get(pool, id).await?;
    if !request.actor.may_act_on(&conv) {
        return Err(ApiError::Forbidden("access denied".into()));
    }

    let (old_status, updated) = conversation::set_status(pool, id, new_status).await?;

    state
        .notifier
        .broadcast(&LedgerEvent::StatusUpdated {
            conversation_id: id,
            old_status: old_status.as_str().to_string(),
            new_status: updated.status.as_str().to_string(),
            updated_by: request.actor.agent_id,
        })
        .await;

    Ok(Json(json!({
        "message": format!("Status updated from {old_status} to {}", updated.status)
    })))
}
