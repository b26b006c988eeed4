//! Reply filter that keeps tiers from escalating around the policy.

/// Phrases that mean the tier is trying to hand the customer off itself.
///
/// A reply containing any of these is discarded as "no answer" so the
/// escalation decision always goes through the policy, never through a
/// tier's own wording.
const HANDOFF_PHRASES: &[&str] = &[
    "transferir",
    "encaminhar para atendente",
    "falar com atendente",
    "não posso ajudar",
    "nao posso ajudar",
    "transfer to an agent",
    "encaminhar_para_humano",
];

/// Whether a tier reply itself implies a handoff to a human agent.
pub fn implies_handoff(text: &str) -> bool {
    let lowered = text.to_lowercase();
    HANDOFF_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_portuguese_handoff_phrases() {
        assert!(implies_handoff("Vou transferir para atendente agora."));
        assert!(implies_handoff("Infelizmente não posso ajudar com isso."));
        assert!(implies_handoff("encaminhar_para_humano"));
    }

    #[test]
    fn detects_english_handoff_phrases() {
        assert!(implies_handoff("Let me transfer to an agent."));
    }

    #[test]
    fn case_insensitive() {
        assert!(implies_handoff("TRANSFERIR PARA ATENDENTE"));
    }

    #[test]
    fn ordinary_replies_pass() {
        assert!(!implies_handoff("Nossos horários são de 8h às 18h."));
        assert!(!implies_handoff("Olá! Como posso ajudá-lo hoje?"));
    }
}
