//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a customer conversation.
///
/// State machine: `pending --(assign/escalate)--> active --(close)--> closed`.
/// `pending` is also the initial state for bot-only interactions that have
/// not escalated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationStatus {
    Pending,
    Active,
    Closed,
}

impl ConversationStatus {
    /// Stable identifier used in queries, events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    /// Parse a status string, returning `None` for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageKind {
    Customer,
    Agent,
    Bot,
    System,
}

impl MessageKind {
    /// Stable identifier used in stored rows and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Bot => "bot",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer conversation thread.
///
/// At most one conversation per customer number may be open
/// (status pending or active) at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Customer phone number.
    pub customer_number: String,
    /// Customer display name, if known.
    pub display_name: Option<String>,
    /// Current state-machine status.
    pub status: ConversationStatus,
    /// Assigned agent, if any.
    pub assigned_agent_id: Option<i64>,
    /// Who created the row ("system" or an agent identifier).
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A single message in a conversation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: i64,
    /// Message author kind.
    pub sender: MessageKind,
    /// Message text.
    pub content: String,
    /// Which responder tier produced it, for bot messages.
    pub responder_tier: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// One automated turn, recorded for analytics and rate accounting.
/// Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BotInteraction {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Customer phone number.
    pub customer_phone: String,
    /// Customer display name at the time.
    pub customer_name: Option<String>,
    /// What the customer said.
    pub user_message: String,
    /// What the bot answered (or the escalation notice).
    pub bot_response: String,
    /// Tier that produced the response.
    pub responder_tier: String,
    /// Whether this turn escalated to a human.
    pub escalated: bool,
    /// Escalation reason, when escalated.
    pub escalation_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Parameters for recording a new bot interaction.
#[derive(Debug, Clone)]
pub struct NewBotInteraction<'a> {
    pub customer_phone: &'a str,
    pub customer_name: Option<&'a str>,
    pub user_message: &'a str,
    pub bot_response: &'a str,
    pub responder_tier: &'a str,
    pub escalated: bool,
    pub escalation_reason: Option<&'a str>,
}

/// A human agent who can take escalated conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role: "agent" or "admin".
    pub role: String,
}

impl Agent {
    /// Whether this agent has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
