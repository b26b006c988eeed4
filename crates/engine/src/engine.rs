//! The engine coordinating one inbound turn.

use std::sync::Arc;

use chrono::{Local, Timelike};
use tracing::{debug, info};

use context_store::{ContextStore, KeyedLocks};
use responder_core::{ContextUpdate, InboundEvent};

use crate::chain::ResponderChain;
use crate::escalation::{EscalationPolicy, EscalationReason};
use crate::notices;
use crate::stage;

/// What the engine decided for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineDecision {
    /// The chain answered; dispatch the reply as a bot message.
    Reply {
        /// Reply text.
        text: String,
        /// Tier that produced it.
        tier: String,
    },
    /// Hand the conversation to a human agent.
    Escalate {
        /// Why the turn escalated.
        reason: EscalationReason,
        /// Customer-facing escalation notice.
        notice: String,
    },
}

/// Per-message conversation router.
///
/// Holds the context store, the per-customer locks, the escalation policy
/// and the responder chain. One call to [`handle_message`](Self::handle_message)
/// is one fully-serialized turn for that customer; different customers run
/// in parallel.
pub struct Engine {
    contexts: Arc<dyn ContextStore>,
    locks: KeyedLocks,
    policy: EscalationPolicy,
    chain: ResponderChain,
}

impl Engine {
    /// Create an engine from its parts.
    pub fn new(contexts: Arc<dyn ContextStore>, policy: EscalationPolicy, chain: ResponderChain) -> Self {
        Self {
            contexts,
            locks: KeyedLocks::new(),
            policy,
            chain,
        }
    }

    /// The context store backing this engine.
    pub fn contexts(&self) -> Arc<dyn ContextStore> {
        Arc::clone(&self.contexts)
    }

    /// Handle one inbound message and decide the automated outcome.
    ///
    /// The whole read-modify-write for the customer's context happens under
    /// that customer's lock, so concurrent webhooks for the same key never
    /// lose updates.
    pub async fn handle_message(&self, event: &InboundEvent) -> EngineDecision {
        let _turn = self.locks.acquire(&event.customer_key).await;

        let stored = self.contexts.get(&event.customer_key).await;

        // The cap counts the turn under evaluation, so the policy sees the
        // turn-inclusive number while reply generation still sees the stored
        // context.
        let mut turn_view = stored.clone();
        turn_view.bot_response_count += 1;

        let current_hour = Local::now().hour();
        if let Some(reason) = self.policy.evaluate(&event.text, &turn_view, current_hour) {
            self.contexts
                .update(
                    &event.customer_key,
                    ContextUpdate::default().escalated(reason.as_str()),
                )
                .await;

            info!(
                customer = %event.customer_key,
                reason = %reason,
                "escalating conversation to a human agent"
            );
            let notice = notices::escalation_notice(reason, &event.display_name);
            return EngineDecision::Escalate { reason, notice };
        }

        match self.chain.respond(event, &stored).await {
            Some(reply) => {
                self.contexts
                    .update(
                        &event.customer_key,
                        ContextUpdate::default()
                            .bot_response_count(turn_view.bot_response_count)
                            .stage(stage::detect(&event.text, stored.stage))
                            .exchange(event.text.clone(), reply.text.clone()),
                    )
                    .await;

                debug!(
                    customer = %event.customer_key,
                    tier = %reply.tier,
                    "responder chain answered"
                );
                EngineDecision::Reply {
                    text: reply.text,
                    tier: reply.tier,
                }
            }
            None => {
                // Nothing left to try; a human takes over.
                let reason = EscalationReason::AllTiersFailed;
                self.contexts
                    .update(
                        &event.customer_key,
                        ContextUpdate::default().escalated(reason.as_str()),
                    )
                    .await;

                info!(customer = %event.customer_key, "no responder tier answered");
                let notice = notices::escalation_notice(reason, &event.display_name);
                EngineDecision::Escalate { reason, notice }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use context_store::MemoryContextStore;
    use fallback_responder::FallbackResponder;
    use responder_core::{ConversationStage, SourceProvider};

    fn engine_with_fallback(max_bot_turns: u32) -> Engine {
        let chain = ResponderChain::new()
            .with_tier(Arc::new(FallbackResponder::new()), Duration::from_secs(1));
        let policy = EscalationPolicy {
            max_bot_turns,
            // Keep the after-hours rule out of play for tests.
            business_hours: crate::gate::BusinessHours { start: 0, end: 24 },
        };
        Engine::new(Arc::new(MemoryContextStore::new()), policy, chain)
    }

    fn event(text: &str) -> InboundEvent {
        InboundEvent::new("+5511999990000", text, "Maria", SourceProvider::Evolution)
    }

    #[tokio::test]
    async fn first_greeting_gets_fallback_reply_and_counts_one_turn() {
        let engine = engine_with_fallback(4);

        let decision = engine.handle_message(&event("Olá")).await;
        match decision {
            EngineDecision::Reply { text, tier } => {
                assert!(text.contains("Maria"));
                assert_eq!(tier, "fallback");
            }
            EngineDecision::Escalate { .. } => panic!("greeting should not escalate"),
        }

        let context = engine.contexts().get("+5511999990000").await;
        assert_eq!(context.bot_response_count, 1);
        assert!(!context.escalation_requested);
    }

    #[tokio::test]
    async fn explicit_request_escalates_regardless_of_context() {
        let engine = engine_with_fallback(4);

        let decision = engine.handle_message(&event("quero falar com atendente")).await;
        match decision {
            EngineDecision::Escalate { reason, notice } => {
                assert_eq!(reason, EscalationReason::UserRequested);
                assert!(notice.contains("Maria"));
            }
            EngineDecision::Reply { .. } => panic!("explicit request must escalate"),
        }

        let context = engine.contexts().get("+5511999990000").await;
        assert!(context.escalation_requested);
        assert_eq!(context.escalation_reason.as_deref(), Some("user_requested"));
    }

    #[tokio::test]
    async fn fourth_turn_hits_the_cap() {
        let engine = engine_with_fallback(4);

        for turn in 1..=3 {
            let decision = engine.handle_message(&event("me conta mais")).await;
            assert!(
                matches!(decision, EngineDecision::Reply { .. }),
                "turn {turn} should still be automated"
            );
        }

        // Fourth message has no escalation keyword of its own.
        let decision = engine.handle_message(&event("me conta mais")).await;
        match decision {
            EngineDecision::Escalate { reason, .. } => {
                assert_eq!(reason, EscalationReason::MaxBotResponses);
            }
            EngineDecision::Reply { .. } => panic!("turn cap should have escalated"),
        }
    }

    #[tokio::test]
    async fn escalation_sticks_on_the_next_turn() {
        let engine = engine_with_fallback(4);

        engine.handle_message(&event("atendente por favor")).await;
        let decision = engine.handle_message(&event("oi de novo")).await;
        match decision {
            EngineDecision::Escalate { reason, .. } => {
                assert_eq!(reason, EscalationReason::PreviousEscalation);
            }
            EngineDecision::Reply { .. } => panic!("prior escalation must stick"),
        }
    }

    #[tokio::test]
    async fn empty_chain_escalates_with_all_tiers_failed() {
        let policy = EscalationPolicy {
            max_bot_turns: 4,
            business_hours: crate::gate::BusinessHours { start: 0, end: 24 },
        };
        let engine = Engine::new(
            Arc::new(MemoryContextStore::new()),
            policy,
            ResponderChain::new(),
        );

        let decision = engine.handle_message(&event("bom dia")).await;
        match decision {
            EngineDecision::Escalate { reason, .. } => {
                assert_eq!(reason, EscalationReason::AllTiersFailed);
            }
            EngineDecision::Reply { .. } => panic!("empty chain cannot reply"),
        }
    }

    #[tokio::test]
    async fn stage_follows_the_conversation() {
        let engine = engine_with_fallback(10);

        engine.handle_message(&event("Olá")).await;
        assert_eq!(
            engine.contexts().get("+5511999990000").await.stage,
            ConversationStage::Greeting
        );

        engine.handle_message(&event("quanto custa o serviço?")).await;
        assert_eq!(
            engine.contexts().get("+5511999990000").await.stage,
            ConversationStage::PricingInquiry
        );
    }

    #[tokio::test]
    async fn parallel_turns_for_one_customer_never_lose_counts() {
        let engine = Arc::new(engine_with_fallback(100));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.handle_message(&event("me conta mais")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let context = engine.contexts().get("+5511999990000").await;
        assert_eq!(context.bot_response_count, 10);
    }
}
