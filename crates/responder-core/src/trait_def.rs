//! The Responder trait definition.

use async_trait::async_trait;

use crate::context::ConversationContext;
use crate::error::ResponderError;
use crate::event::InboundEvent;

/// Result of asking one tier for a reply.
///
/// A tier either produces text or passes; "could not answer" is a normal
/// outcome, not an error, so the fallthrough chain stays explicit and
/// exhaustively handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderOutcome {
    /// The tier produced a reply.
    Responded {
        /// Reply text for the customer.
        text: String,
    },
    /// The tier has nothing to say; the chain moves on.
    NoAnswer,
}

impl ResponderOutcome {
    /// Construct a `Responded` outcome.
    pub fn responded(text: impl Into<String>) -> Self {
        Self::Responded { text: text.into() }
    }

    /// Whether this outcome carries a reply.
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Responded { .. })
    }
}

/// A trait for responder tiers that may answer a customer message.
///
/// Implementations range from pure keyword bots to HTTP-backed LLM
/// services. The trait is object-safe and used with `Arc<dyn Responder>`
/// inside the ordered chain.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Attempt to answer the message given the customer's context.
    ///
    /// Returning `Ok(NoAnswer)` or `Err(_)` both mean "next tier, please";
    /// only `Ok(Responded { .. })` stops the chain.
    async fn try_respond(
        &self,
        event: &InboundEvent,
        context: &ConversationContext,
    ) -> Result<ResponderOutcome, ResponderError>;

    /// Stable tier name recorded on messages and interactions
    /// (e.g. "llm", "secondary-llm", "nlu", "fallback").
    fn tier(&self) -> &str;

    /// Check if the tier is ready to answer.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
