//! Conversation stage detection from message content.

use responder_core::ConversationStage;

/// Classify the stage of a conversation from the latest customer message,
/// keeping the previous stage when nothing matches (first turn defaults to
/// `General`).
pub fn detect(text: &str, previous: ConversationStage) -> ConversationStage {
    let lowered = text.to_lowercase();

    if ["oi", "ola", "olá", "hello", "hi"].iter().any(|w| lowered.contains(w)) {
        ConversationStage::Greeting
    } else if ["preco", "preço", "valor", "quanto custa"]
        .iter()
        .any(|w| lowered.contains(w))
    {
        ConversationStage::PricingInquiry
    } else if ["problema", "erro", "bug"].iter().any(|w| lowered.contains(w)) {
        ConversationStage::SupportRequest
    } else if ["horario", "horário", "funcionamento"]
        .iter()
        .any(|w| lowered.contains(w))
    {
        ConversationStage::InfoRequest
    } else if ["obrigado", "obrigada", "valeu", "thanks"]
        .iter()
        .any(|w| lowered.contains(w))
    {
        ConversationStage::Closing
    } else if previous == ConversationStage::Greeting {
        ConversationStage::General
    } else {
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_stage() {
        let prev = ConversationStage::Greeting;
        assert_eq!(detect("olá!", prev), ConversationStage::Greeting);
        assert_eq!(detect("quanto custa o plano?", prev), ConversationStage::PricingInquiry);
        assert_eq!(detect("deu erro aqui", prev), ConversationStage::SupportRequest);
        assert_eq!(detect("qual o horario?", prev), ConversationStage::InfoRequest);
        assert_eq!(detect("valeu!", prev), ConversationStage::Closing);
    }

    #[test]
    fn unmatched_text_keeps_previous_stage() {
        assert_eq!(
            detect("xyzzy", ConversationStage::PricingInquiry),
            ConversationStage::PricingInquiry
        );
    }

    #[test]
    fn unmatched_text_after_greeting_becomes_general() {
        assert_eq!(
            detect("xyzzy", ConversationStage::Greeting),
            ConversationStage::General
        );
    }
}
