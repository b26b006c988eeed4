//! The escalation decision function.

use responder_core::ConversationContext;

use crate::gate::BusinessHours;

/// Keywords that mean the customer is asking for a person.
const ESCALATION_KEYWORDS: &[&str] = &[
    "falar com atendente",
    "atendente",
    "operador",
    "humano",
    "pessoa",
    "talk to agent",
    "agent",
    "human",
    "operator",
    "representative",
    "urgente",
    "urgent",
    "problema grave",
    "serious problem",
    "reclamação",
    "complaint",
    "insatisfeito",
    "dissatisfied",
];

/// Intents too delicate for a bot: money and account trouble.
const COMPLEX_INTENT_KEYWORDS: &[&str] = &[
    "refund",
    "reembolso",
    "cancelamento",
    "cancel",
    "estorno",
    "problema técnico",
    "technical issue",
    "bug",
    "falha",
    "conta bloqueada",
    "account blocked",
    "login problem",
    "cobrança incorreta",
    "billing issue",
    "pagamento",
];

/// Phrases that signal the customer is losing patience.
const FRUSTRATION_KEYWORDS: &[&str] = &[
    "não entendi",
    "nao entendi",
    "não funciona",
    "nao funciona",
    "frustrado",
    "irritado",
    "confused",
    "frustrated",
    "não resolve",
    "não ajuda",
];

/// Why a conversation is handed to a human agent.
///
/// Exactly one reason is ever produced per decision; reasons are never
/// combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    /// The customer explicitly asked for a person.
    UserRequested,
    /// The bot already used up its turns for this context window.
    MaxBotResponses,
    /// The message matches a complex intent (refund, billing, ...).
    ComplexIntent,
    /// The customer sounds frustrated.
    UserFrustration,
    /// A prior turn already decided to escalate.
    PreviousEscalation,
    /// Complex intent outside business hours.
    OutsideBusinessHours,
    /// Every responder tier, including the fallback, was bypassed or dry.
    AllTiersFailed,
}

impl EscalationReason {
    /// Stable identifier recorded on contexts, interactions and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRequested => "user_requested",
            Self::MaxBotResponses => "max_bot_responses",
            Self::ComplexIntent => "complex_intent",
            Self::UserFrustration => "user_frustration",
            Self::PreviousEscalation => "previous_escalation",
            Self::OutsideBusinessHours => "outside_business_hours",
            Self::AllTiersFailed => "all_tiers_failed",
        }
    }
}

impl std::fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based escalation policy.
///
/// [`evaluate`](Self::evaluate) is pure: same message, context and hour always
/// yield the same answer, and nothing is written anywhere. The caller persists
/// the decision into the context store.
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    /// Automated turns allowed per context window before a human takes over.
    pub max_bot_turns: u32,
    /// Business-hours window used by the complex-intent-after-hours rule.
    pub business_hours: BusinessHours,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            max_bot_turns: 4,
            business_hours: BusinessHours { start: 8, end: 18 },
        }
    }
}

impl EscalationPolicy {
    /// Decide whether this turn escalates, in fixed priority order.
    /// First match wins; `context.bot_response_count` already includes the
    /// turn under evaluation.
    pub fn evaluate(
        &self,
        text: &str,
        context: &ConversationContext,
        current_hour: u32,
    ) -> Option<EscalationReason> {
        let lowered = text.to_lowercase();

        if ESCALATION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return Some(EscalationReason::UserRequested);
        }

        if context.bot_response_count >= self.max_bot_turns {
            return Some(EscalationReason::MaxBotResponses);
        }

        let complex = COMPLEX_INTENT_KEYWORDS.iter().any(|k| lowered.contains(k));
        if complex {
            return Some(EscalationReason::ComplexIntent);
        }

        if FRUSTRATION_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return Some(EscalationReason::UserFrustration);
        }

        if context.escalation_requested {
            return Some(EscalationReason::PreviousEscalation);
        }

        if !self.business_hours.contains(current_hour) && complex {
            return Some(EscalationReason::OutsideBusinessHours);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use responder_core::{default_context_ttl, ContextUpdate, ConversationContext};

    const WITHIN_HOURS: u32 = 10;

    fn context() -> ConversationContext {
        ConversationContext::new("+5511999990000", default_context_ttl())
    }

    fn policy() -> EscalationPolicy {
        EscalationPolicy::default()
    }

    #[test]
    fn explicit_request_escalates() {
        let reason = policy().evaluate("quero falar com atendente", &context(), WITHIN_HOURS);
        assert_eq!(reason, Some(EscalationReason::UserRequested));
    }

    #[test]
    fn explicit_request_wins_over_frustration() {
        // Both rule 1 and rule 4 match; priority order keeps rule 1.
        let reason = policy().evaluate(
            "não funciona, quero um agent agora",
            &context(),
            WITHIN_HOURS,
        );
        assert_eq!(reason, Some(EscalationReason::UserRequested));
    }

    #[test]
    fn turn_cap_escalates() {
        let mut ctx = context();
        ctx.apply(
            ContextUpdate::default().bot_response_count(4),
            default_context_ttl(),
        );
        let reason = policy().evaluate("e agora?", &ctx, WITHIN_HOURS);
        assert_eq!(reason, Some(EscalationReason::MaxBotResponses));
    }

    #[test]
    fn below_turn_cap_does_not_escalate() {
        let mut ctx = context();
        ctx.apply(
            ContextUpdate::default().bot_response_count(3),
            default_context_ttl(),
        );
        assert_eq!(policy().evaluate("e agora?", &ctx, WITHIN_HOURS), None);
    }

    #[test]
    fn complex_intent_escalates() {
        let reason = policy().evaluate("preciso de um reembolso", &context(), WITHIN_HOURS);
        assert_eq!(reason, Some(EscalationReason::ComplexIntent));
    }

    #[test]
    fn frustration_escalates() {
        let reason = policy().evaluate("isso não funciona", &context(), WITHIN_HOURS);
        assert_eq!(reason, Some(EscalationReason::UserFrustration));
    }

    #[test]
    fn previous_escalation_sticks() {
        let mut ctx = context();
        ctx.apply(
            ContextUpdate::default().escalated("user_requested"),
            default_context_ttl(),
        );
        let reason = policy().evaluate("oi de novo", &ctx, WITHIN_HOURS);
        assert_eq!(reason, Some(EscalationReason::PreviousEscalation));
    }

    #[test]
    fn plain_message_does_not_escalate() {
        assert_eq!(policy().evaluate("bom dia!", &context(), WITHIN_HOURS), None);
    }

    #[test]
    fn deterministic_and_single_reason() {
        let ctx = context();
        let first = policy().evaluate("reembolso urgente", &ctx, WITHIN_HOURS);
        let second = policy().evaluate("reembolso urgente", &ctx, WITHIN_HOURS);
        // "urgente" (rule 1) and "reembolso" (rule 3) both match; only the
        // higher-priority reason is ever returned, consistently.
        assert_eq!(first, Some(EscalationReason::UserRequested));
        assert_eq!(first, second);
    }

    #[test]
    fn after_hours_complex_intent_needs_both_conditions() {
        // Complex intent inside business hours hits rule 3 first.
        assert_eq!(
            policy().evaluate("cobrança incorreta", &context(), 22),
            Some(EscalationReason::ComplexIntent)
        );
        // A plain message after hours does not escalate at all.
        assert_eq!(policy().evaluate("bom dia!", &context(), 22), None);
    }
}
