//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use engine::{Engine, HumanDelay, MessageSender, OutboundGate};

use crate::config::ServerConfig;
use crate::notifier::ConnectionManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Conversation ledger.
    pub db: Database,
    /// Routing and escalation engine.
    pub engine: Arc<Engine>,
    /// Pre-send gate for automated messages.
    pub gate: OutboundGate,
    /// Human-like delay window for automated sends.
    pub delay: HumanDelay,
    /// Realtime fan-out to connected agent sessions.
    pub notifier: Arc<ConnectionManager>,
    /// Outbound gateway.
    pub sender: Arc<dyn MessageSender>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
