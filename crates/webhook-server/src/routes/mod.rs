//! Route handlers for the webhook server.

pub mod chatbot;
pub mod conversations;
pub mod health;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Provider webhooks
        .route("/webhook/twilio", post(webhooks::twilio))
        .route("/webhook/evolution", post(webhooks::evolution))
        .route("/webhook/waha", post(webhooks::waha))
        .route("/webhook/n8n", post(webhooks::n8n))
        // Health check
        .route("/health", get(health::health))
        // Agent-facing conversation API
        .route("/conversations", get(conversations::list))
        .route(
            "/conversations/:id/messages",
            get(conversations::messages),
        )
        .route("/conversations/:id/reply", post(conversations::reply))
        .route("/conversations/:id/close", post(conversations::close))
        .route("/conversations/:id/assign", post(conversations::assign))
        .route("/conversations/:id/status", post(conversations::status))
        // Chatbot management
        .route("/chatbot/analytics", get(chatbot::analytics))
        .route(
            "/chatbot/clear-context/:customer_key",
            post(chatbot::clear_context),
        )
        .route("/chatbot/cleanup-contexts", post(chatbot::cleanup_contexts))
        // Realtime channel for agents
        .route("/ws", get(ws::ws_handler))
}
