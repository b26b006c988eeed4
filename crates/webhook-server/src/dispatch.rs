//! The shared inbound pipeline behind every provider webhook.

use std::sync::Arc;

use chrono::{Local, Timelike};
use tracing::{info, warn};

use database::models::{ConversationStatus, MessageKind, NewBotInteraction};
use database::{agent, bot_interaction, conversation, message, Conversation};
use engine::{EngineDecision, HumanDelay, MessageSender};
use responder_core::InboundEvent;

use crate::error::Result;
use crate::notifier::LedgerEvent;
use crate::state::AppState;

/// How one inbound turn ended, for the webhook acknowledgement.
#[derive(Debug, Clone)]
pub enum InboundDisposition {
    /// The gate suppressed the turn; nothing was recorded or sent.
    Ignored { reason: &'static str },
    /// The chain answered and the reply is on its way out.
    Replied {
        conversation_id: i64,
        text: String,
        tier: String,
    },
    /// The conversation escalated to a human agent.
    Escalated {
        conversation_id: i64,
        reason: &'static str,
        notice: String,
    },
}

/// Run one normalized inbound event through gates, engine, ledger, fan-out
/// and the deferred send.
pub async fn handle_inbound(state: &AppState, event: InboundEvent) -> Result<InboundDisposition> {
    let pool = state.db.pool();

    // Gates come first: a suppressed turn records nothing, so gated
    // customers do not consume rate budget either.
    let gate_decision = state
        .gate
        .check(pool, &event.customer_key, Local::now().hour())
        .await?;
    if let Some(reason) = gate_decision.reason() {
        info!(customer = %event.customer_key, reason, "inbound turn suppressed by gate");
        return Ok(InboundDisposition::Ignored { reason });
    }

    let decision = state.engine.handle_message(&event).await;

    match decision {
        EngineDecision::Reply { text, tier } => {
            let conversation = find_or_create_open(state, &event, ConversationStatus::Pending).await?;

            let customer_msg = message::append(
                pool,
                conversation.id,
                MessageKind::Customer,
                &event.text,
                None,
            )
            .await?;
            let bot_msg =
                message::append(pool, conversation.id, MessageKind::Bot, &text, Some(&tier))
                    .await?;

            bot_interaction::record(
                pool,
                &NewBotInteraction {
                    customer_phone: &event.customer_key,
                    customer_name: Some(&event.display_name),
                    user_message: &event.text,
                    bot_response: &text,
                    responder_tier: &tier,
                    escalated: false,
                    escalation_reason: None,
                },
            )
            .await?;

            state
                .notifier
                .broadcast(&LedgerEvent::CustomerMessage {
                    id: customer_msg.id,
                    conversation_id: conversation.id,
                    content: event.text.clone(),
                    customer_name: event.display_name.clone(),
                    customer_number: event.customer_key.clone(),
                    timestamp: customer_msg.created_at.clone(),
                })
                .await;
            state
                .notifier
                .broadcast(&LedgerEvent::BotMessage {
                    id: bot_msg.id,
                    conversation_id: conversation.id,
                    content: text.clone(),
                    responder_tier: tier.clone(),
                    timestamp: bot_msg.created_at.clone(),
                })
                .await;

            send_delayed(state, event.customer_key.clone(), text.clone());

            Ok(InboundDisposition::Replied {
                conversation_id: conversation.id,
                text,
                tier,
            })
        }

        EngineDecision::Escalate { reason, notice } => {
            let assignee = agent::least_busy(pool).await?;
            let conversation = match conversation::find_open(pool, &event.customer_key).await? {
                Some(existing) => {
                    conversation::escalate(pool, existing.id, assignee.as_ref().map(|a| a.id))
                        .await?
                }
                None => {
                    let created = conversation::create(
                        pool,
                        &event.customer_key,
                        Some(&event.display_name),
                        "system",
                        ConversationStatus::Active,
                    )
                    .await?;
                    match assignee.as_ref() {
                        Some(agent) => {
                            conversation::assign(pool, created.id, agent.id, false).await?
                        }
                        None => created,
                    }
                }
            };

            let customer_msg = message::append(
                pool,
                conversation.id,
                MessageKind::Customer,
                &event.text,
                None,
            )
            .await?;
            message::append(
                pool,
                conversation.id,
                MessageKind::Bot,
                &notice,
                Some("escalation"),
            )
            .await?;

            bot_interaction::record(
                pool,
                &NewBotInteraction {
                    customer_phone: &event.customer_key,
                    customer_name: Some(&event.display_name),
                    user_message: &event.text,
                    bot_response: &notice,
                    responder_tier: "escalation",
                    escalated: true,
                    escalation_reason: Some(reason.as_str()),
                },
            )
            .await?;

            let history_count = message::count(pool, conversation.id).await?;

            state
                .notifier
                .broadcast(&LedgerEvent::CustomerMessage {
                    id: customer_msg.id,
                    conversation_id: conversation.id,
                    content: event.text.clone(),
                    customer_name: event.display_name.clone(),
                    customer_number: event.customer_key.clone(),
                    timestamp: customer_msg.created_at.clone(),
                })
                .await;
            state
                .notifier
                .broadcast(&LedgerEvent::NewEscalation {
                    conversation_id: conversation.id,
                    customer_name: event.display_name.clone(),
                    customer_number: event.customer_key.clone(),
                    escalation_reason: reason.as_str().to_string(),
                    message_history_count: history_count,
                    conversation_status: conversation.status.as_str().to_string(),
                    assigned_agent: conversation.assigned_agent_id,
                    timestamp: customer_msg.created_at.clone(),
                })
                .await;

            send_delayed(state, event.customer_key.clone(), notice.clone());

            Ok(InboundDisposition::Escalated {
                conversation_id: conversation.id,
                reason: reason.as_str(),
                notice,
            })
        }
    }
}

/// Reuse the open conversation for a customer or create one lazily.
async fn find_or_create_open(
    state: &AppState,
    event: &InboundEvent,
    status: ConversationStatus,
) -> Result<Conversation> {
    let pool = state.db.pool();
    match conversation::find_open(pool, &event.customer_key).await? {
        Some(existing) => Ok(existing),
        None => Ok(conversation::create(
            pool,
            &event.customer_key,
            Some(&event.display_name),
            "system",
            status,
        )
        .await?),
    }
}

/// Dispatch an automated message after the human-like delay, detached from
/// the webhook acknowledgement. Exactly one send per decided response; a
/// failure is logged and the recorded state stands.
fn send_delayed(state: &AppState, recipient: String, text: String) {
    let sender: Arc<dyn MessageSender> = Arc::clone(&state.sender);
    let delay: HumanDelay = state.delay;
    tokio::spawn(async move {
        delay.wait().await;
        if let Err(e) = sender.send_text(&recipient, &text).await {
            warn!(recipient = %recipient, error = %e, "outbound send failed");
        }
    });
}
