//! The ordered responder chain.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use responder_core::{
    implies_handoff, ConversationContext, InboundEvent, Responder, ResponderOutcome,
};

/// A winning reply from the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReply {
    /// Reply text for the customer.
    pub text: String,
    /// Which tier produced it.
    pub tier: String,
}

struct TierEntry {
    responder: Arc<dyn Responder>,
    timeout: Duration,
}

/// Ordered responder tiers, called one at a time; the first usable reply wins.
///
/// A timeout, transport error, empty reply or handoff-implying reply all
/// degrade to "no answer" and the chain falls through to the next tier.
/// With the permanent fallback installed last, the chain cannot come back
/// empty.
#[derive(Default)]
pub struct ResponderChain {
    tiers: Vec<TierEntry>,
}

impl ResponderChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier with its per-call timeout. Builder-style.
    pub fn with_tier(mut self, responder: Arc<dyn Responder>, call_timeout: Duration) -> Self {
        self.push(responder, call_timeout);
        self
    }

    /// Append a tier with its per-call timeout.
    pub fn push(&mut self, responder: Arc<dyn Responder>, call_timeout: Duration) {
        self.tiers.push(TierEntry {
            responder,
            timeout: call_timeout,
        });
    }

    /// Number of installed tiers.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether no tiers are installed.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Ask each tier in order; return the first usable reply.
    pub async fn respond(
        &self,
        event: &InboundEvent,
        context: &ConversationContext,
    ) -> Option<ChainReply> {
        for entry in &self.tiers {
            let tier = entry.responder.tier().to_string();

            let outcome = match timeout(entry.timeout, entry.responder.try_respond(event, context))
                .await
            {
                Err(_) => {
                    warn!(tier = %tier, timeout_ms = entry.timeout.as_millis() as u64, "responder timed out");
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(tier = %tier, error = %e, "responder failed");
                    continue;
                }
                Ok(Ok(outcome)) => outcome,
            };

            match outcome {
                ResponderOutcome::NoAnswer => {
                    debug!(tier = %tier, "responder passed");
                }
                ResponderOutcome::Responded { text } => {
                    let text = text.trim();
                    if text.is_empty() {
                        debug!(tier = %tier, "responder returned an empty reply");
                        continue;
                    }
                    if implies_handoff(text) {
                        debug!(tier = %tier, "responder reply implied a handoff, discarded");
                        continue;
                    }
                    return Some(ChainReply {
                        text: text.to_string(),
                        tier,
                    });
                }
            }
        }

        None
    }
}
