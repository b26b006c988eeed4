//! Customer-facing notices sent around escalations and closures.

use crate::escalation::EscalationReason;

/// The notice sent to the customer when a conversation escalates, worded
/// per reason.
pub fn escalation_notice(reason: EscalationReason, display_name: &str) -> String {
    match reason {
        EscalationReason::UserRequested => format!(
            "Perfeito, {display_name}! Vou conectar você com um de nossos atendentes. \
             Um momento, por favor."
        ),
        EscalationReason::MaxBotResponses => format!(
            "Para melhor atendê-lo, {display_name}, vou conectar você com um atendente \
             especializado."
        ),
        EscalationReason::ComplexIntent => format!(
            "Entendo que sua solicitação é importante, {display_name}. Vou conectar \
             você com um especialista que pode ajudá-lo melhor."
        ),
        EscalationReason::UserFrustration => format!(
            "Peço desculpas pela confusão, {display_name}. Vou transferir você para um \
             atendente humano agora."
        ),
        EscalationReason::PreviousEscalation => format!(
            "Como solicitado, {display_name}, vou conectar você com um atendente."
        ),
        EscalationReason::OutsideBusinessHours => format!(
            "Como estamos fora do horário comercial, {display_name}, vou conectar você \
             com nosso atendente de plantão."
        ),
        EscalationReason::AllTiersFailed => format!(
            "Para garantir o melhor atendimento, {display_name}, vou conectar você com \
             nossa equipe."
        ),
    }
}

/// The notice sent to the customer when an agent closes the conversation.
pub fn closing_notice(display_name: &str) -> String {
    format!(
        "Obrigado pelo contato, {display_name}! Sua conversa foi finalizada. \
         Se precisar de mais alguma coisa, estaremos aqui!"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_has_a_personalized_notice() {
        for reason in [
            EscalationReason::UserRequested,
            EscalationReason::MaxBotResponses,
            EscalationReason::ComplexIntent,
            EscalationReason::UserFrustration,
            EscalationReason::PreviousEscalation,
            EscalationReason::OutsideBusinessHours,
            EscalationReason::AllTiersFailed,
        ] {
            let notice = escalation_notice(reason, "Maria");
            assert!(notice.contains("Maria"), "notice for {reason} lacks the name");
            assert!(!notice.is_empty());
        }
    }

    #[test]
    fn closing_notice_mentions_customer() {
        assert!(closing_notice("Maria").contains("Maria"));
    }
}
