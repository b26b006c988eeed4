//! Realtime fan-out of ledger events to connected agent sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A JSON event pushed to agent clients over the realtime channel.
///
/// No delivery guarantee and no replay: a disconnected agent misses events
/// and re-syncs through the query routes on reconnect.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A customer message arrived.
    CustomerMessage {
        id: i64,
        conversation_id: i64,
        content: String,
        customer_name: String,
        customer_number: String,
        timestamp: String,
    },
    /// The bot answered a customer.
    BotMessage {
        id: i64,
        conversation_id: i64,
        content: String,
        responder_tier: String,
        timestamp: String,
    },
    /// An agent replied in a conversation.
    AgentMessage {
        id: i64,
        conversation_id: i64,
        content: String,
        agent_id: i64,
        timestamp: String,
    },
    /// A conversation escalated to a human agent.
    NewEscalation {
        conversation_id: i64,
        customer_name: String,
        customer_number: String,
        escalation_reason: String,
        message_history_count: i64,
        conversation_status: String,
        assigned_agent: Option<i64>,
        timestamp: String,
    },
    /// A conversation was closed.
    ConversationClosed {
        conversation_id: i64,
        customer_name: Option<String>,
        closed_by: i64,
    },
    /// A conversation's status changed.
    StatusUpdated {
        conversation_id: i64,
        old_status: String,
        new_status: String,
        updated_by: i64,
    },
}

/// The set of currently connected agent sessions.
///
/// Injected through application state; handlers never reach for a global.
pub struct ConnectionManager {
    connections: RwLock<HashMap<u64, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl ConnectionManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a connection; returns its id and the event receiver to drain.
    pub async fn connect(&self) -> (u64, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.write().await.insert(id, tx);
        debug!(connection = id, "agent session connected");
        (id, rx)
    }

    /// Remove a connection.
    pub async fn disconnect(&self, id: u64) {
        if self.connections.write().await.remove(&id).is_some() {
            debug!(connection = id, "agent session disconnected");
        }
    }

    /// Number of connected sessions.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Best-effort delivery to every connection.
    ///
    /// A connection that cannot receive is evicted; one bad connection never
    /// blocks or fails the broadcast.
    pub async fn broadcast(&self, event: &LedgerEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize ledger event");
                return;
            }
        };

        let mut dead = Vec::new();
        {
            let connections = self.connections.read().await;
            for (id, tx) in connections.iter() {
                if tx.send(payload.clone()).is_err() {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut connections = self.connections.write().await;
            for id in dead {
                connections.remove(&id);
                debug!(connection = id, "evicted broken agent session");
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> LedgerEvent {
        LedgerEvent::BotMessage {
            id: 1,
            conversation_id: 7,
            content: "Olá!".to_string(),
            responder_tier: "fallback".to_string(),
            timestamp: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let manager = ConnectionManager::new();
        let (_id_a, mut rx_a) = manager.connect().await;
        let (_id_b, mut rx_b) = manager.connect().await;

        manager.broadcast(&sample_event()).await;

        let a = rx_a.recv().await.unwrap();
        let b = rx_b.recv().await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"type\":\"bot_message\""));
    }

    #[tokio::test]
    async fn broken_connections_are_evicted() {
        let manager = ConnectionManager::new();
        let (_alive, mut rx) = manager.connect().await;
        let (_dead, dead_rx) = manager.connect().await;
        drop(dead_rx);

        assert_eq!(manager.connection_count().await, 2);
        manager.broadcast(&sample_event()).await;
        assert_eq!(manager.connection_count().await, 1);

        // The healthy connection still got the event.
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn disconnect_removes_the_session() {
        let manager = ConnectionManager::new();
        let (id, _rx) = manager.connect().await;
        manager.disconnect(id).await;
        assert_eq!(manager.connection_count().await, 0);
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = LedgerEvent::NewEscalation {
            conversation_id: 3,
            customer_name: "Maria".to_string(),
            customer_number: "+5511999990000".to_string(),
            escalation_reason: "user_requested".to_string(),
            message_history_count: 4,
            conversation_status: "active".to_string(),
            assigned_agent: Some(2),
            timestamp: "2024-01-01 12:00:00".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"new_escalation\""));
        assert!(json.contains("\"escalation_reason\":\"user_requested\""));
    }
}
