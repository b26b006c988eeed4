//! Per-customer conversational context and its merge contract.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default context time-to-live in seconds: two hours.
pub const DEFAULT_CONTEXT_TTL_SECS: i64 = 2 * 60 * 60;

/// Default context time-to-live as a [`Duration`].
pub fn default_context_ttl() -> Duration {
    Duration::seconds(DEFAULT_CONTEXT_TTL_SECS)
}

/// Coarse stage of a customer conversation, derived from message content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    /// Opening pleasantries.
    #[default]
    Greeting,
    /// Asking about prices or costs.
    PricingInquiry,
    /// Reporting a problem.
    SupportRequest,
    /// Asking for hours, contact details and the like.
    InfoRequest,
    /// Wrapping up (thanks, goodbye).
    Closing,
    /// Anything else.
    General,
}

impl ConversationStage {
    /// Stable identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::PricingInquiry => "pricing_inquiry",
            Self::SupportRequest => "support_request",
            Self::InfoRequest => "info_request",
            Self::Closing => "closing",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TTL-bound conversational state for one customer key.
///
/// At most one live context exists per key. A context whose `expires_at`
/// has passed is logically absent: any read after expiry is a miss that
/// produces a fresh default, never the stale record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Customer thread identifier (typically a phone number).
    pub customer_key: String,
    /// Current conversation stage.
    pub stage: ConversationStage,
    /// Automated turns handled for this customer within the TTL window.
    pub bot_response_count: u32,
    /// Whether a prior turn already decided to escalate.
    pub escalation_requested: bool,
    /// Reason recorded by the last escalation decision.
    pub escalation_reason: Option<String>,
    /// Last message received from the customer.
    pub last_user_message: Option<String>,
    /// Last automated reply sent to the customer.
    pub last_bot_response: Option<String>,
    /// When the context was last written.
    pub last_updated: DateTime<Utc>,
    /// Absolute expiry instant (`last_updated` + TTL).
    pub expires_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Create a fresh default context for a customer key.
    pub fn new(customer_key: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            customer_key: customer_key.into(),
            stage: ConversationStage::Greeting,
            bot_response_count: 0,
            escalation_requested: false,
            escalation_reason: None,
            last_user_message: None,
            last_bot_response: None,
            last_updated: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the context is expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the context is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Merge an update into this context, bumping both timestamps.
    pub fn apply(&mut self, update: ContextUpdate, ttl: Duration) {
        if let Some(stage) = update.stage {
            self.stage = stage;
        }
        if let Some(count) = update.bot_response_count {
            self.bot_response_count = count;
        }
        if let Some(requested) = update.escalation_requested {
            self.escalation_requested = requested;
        }
        if let Some(reason) = update.escalation_reason {
            self.escalation_reason = Some(reason);
        }
        if let Some(message) = update.last_user_message {
            self.last_user_message = Some(message);
        }
        if let Some(response) = update.last_bot_response {
            self.last_bot_response = Some(response);
        }
        let now = Utc::now();
        self.last_updated = now;
        self.expires_at = now + ttl;
    }
}

/// Partial update merged into a [`ConversationContext`].
///
/// Only the set fields are merged; applying any update refreshes
/// `last_updated` and `expires_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextUpdate {
    pub stage: Option<ConversationStage>,
    pub bot_response_count: Option<u32>,
    pub escalation_requested: Option<bool>,
    pub escalation_reason: Option<String>,
    pub last_user_message: Option<String>,
    pub last_bot_response: Option<String>,
}

impl ContextUpdate {
    /// Set the conversation stage.
    pub fn stage(mut self, stage: ConversationStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the automated turn count.
    pub fn bot_response_count(mut self, count: u32) -> Self {
        self.bot_response_count = Some(count);
        self
    }

    /// Mark the context as escalated with the given reason.
    pub fn escalated(mut self, reason: impl Into<String>) -> Self {
        self.escalation_requested = Some(true);
        self.escalation_reason = Some(reason.into());
        self
    }

    /// Record the latest user/bot exchange.
    pub fn exchange(mut self, user_message: impl Into<String>, bot_response: impl Into<String>) -> Self {
        self.last_user_message = Some(user_message.into());
        self.last_bot_response = Some(bot_response.into());
        self
    }
}
