//! Rule-based fallback responder implementation.

use async_trait::async_trait;

use responder_core::{
    ConversationContext, InboundEvent, Responder, ResponderError, ResponderOutcome,
};

const BUSINESS_HOURS_INFO: &str = "\
📅 Nossos horários de atendimento:

🕘 Segunda a Sexta: 8h às 18h
🕘 Sábado: 8h às 12h
❌ Domingo: Fechado

Fora desses horários, deixe sua mensagem que retornaremos assim que possível!";

const CONTACT_INFO: &str = "\
📞 Nossos contatos:

📱 WhatsApp: Este número que você está usando
☎️ Telefone: (11) 1234-5678
📧 Email: contato@empresa.com

Estou aqui para ajudar no que precisar!";

const PRICING_INFO: &str = "Para informações detalhadas sobre preços, posso conectá-lo \
com um consultor. Digite 'atendente' se desejar!";

const SERVICES_INFO: &str = "Temos vários serviços disponíveis! Para informações \
específicas, posso conectá-lo com nossa equipe. Digite 'atendente'!";

const GREETING_WORDS: &[&str] = &["oi", "ola", "olá", "hello", "hi", "bom dia", "boa tarde", "boa noite"];
const THANKS_WORDS: &[&str] = &["obrigado", "obrigada", "valeu", "thanks"];
const PROBLEM_WORDS: &[&str] = &["problema", "erro", "nao funciona", "não funciona", "bug", "defeito"];
const COMPLAINT_WORDS: &[&str] = &["reclamacao", "reclamação", "insatisfeito", "ruim", "pessimo", "péssimo"];

/// FAQ topics matched by keyword, in match order.
const FAQ_TOPICS: &[(&str, &str)] = &[
    ("horario", BUSINESS_HOURS_INFO),
    ("horário", BUSINESS_HOURS_INFO),
    ("funcionamento", BUSINESS_HOURS_INFO),
    ("contato", CONTACT_INFO),
    ("telefone", CONTACT_INFO),
    ("email", CONTACT_INFO),
    ("endereco", CONTACT_INFO),
    ("endereço", CONTACT_INFO),
    ("preco", PRICING_INFO),
    ("preço", PRICING_INFO),
    ("valor", PRICING_INFO),
    ("servico", SERVICES_INFO),
    ("serviço", SERVICES_INFO),
    ("produto", SERVICES_INFO),
];

/// The permanent fallback tier.
///
/// Pure and deterministic: the same message, name and context always produce
/// the same reply, and no call can fail. This is what guarantees the chain
/// never comes back empty.
#[derive(Debug, Clone, Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    /// Create a new fallback responder.
    pub fn new() -> Self {
        Self
    }

    /// Produce a reply for the message. Infallible by construction.
    pub fn reply(&self, message: &str, display_name: &str, context: &ConversationContext) -> String {
        let lowered = message.to_lowercase();
        let lowered = lowered.trim();

        if GREETING_WORDS.iter().any(|w| lowered.contains(w)) {
            let mut greeting = format!("Olá {display_name}! 👋 ");
            if context.bot_response_count > 0 {
                greeting.push_str("Que bom ter você de volta! ");
            } else {
                greeting.push_str("Bem-vindo! ");
            }
            greeting.push_str(
                "Como posso ajudá-lo hoje?\n\n\
                 🕒 Horários de atendimento\n\
                 💰 Preços e serviços\n\
                 📞 Informações de contato\n\
                 ❓ Dúvidas gerais\n\n\
                 Ou digite 'atendente' para falar com nossa equipe!",
            );
            return greeting;
        }

        if THANKS_WORDS.iter().any(|w| lowered.contains(w)) {
            return format!(
                "😊 Por nada, {display_name}! Fico feliz em ajudar! \
                 Se precisar de mais alguma coisa, estarei aqui!"
            );
        }

        for (keyword, response) in FAQ_TOPICS {
            if lowered.contains(keyword) {
                return (*response).to_string();
            }
        }

        if PROBLEM_WORDS.iter().any(|w| lowered.contains(w)) {
            return format!(
                "🔧 Entendo que você está com um problema, {display_name}. \
                 Para resolver isso da melhor forma, vou conectar você com nosso \
                 suporte técnico. Digite 'atendente' para continuar."
            );
        }

        if COMPLAINT_WORDS.iter().any(|w| lowered.contains(w)) {
            return format!(
                "😔 Lamento que tenha tido uma experiência negativa, {display_name}. \
                 Sua opinião é muito importante. Vou conectar você com um supervisor. \
                 Digite 'atendente'."
            );
        }

        // Rotate the default so repeated unresolved turns vary the phrasing.
        let defaults = [
            format!(
                "Recebi sua mensagem, {display_name}! Para ajudá-lo melhor, posso \
                 conectá-lo com um atendente. Digite 'atendente' ou me diga como posso \
                 ajudar com:\n\n🕒 Horários\n💰 Preços\n📞 Contato"
            ),
            format!(
                "Obrigado pela mensagem, {display_name}! Posso ajudar com informações \
                 básicas ou conectá-lo com um especialista. Digite 'atendente' para \
                 falar com nossa equipe!"
            ),
            format!(
                "Entendi, {display_name}! Para melhor atendê-lo, posso conectar você \
                 com um atendente humano. Digite 'atendente' ou me diga sobre o que \
                 gostaria de saber!"
            ),
        ];
        let index = context.bot_response_count as usize % defaults.len();
        defaults[index].clone()
    }
}

#[async_trait]
impl Responder for FallbackResponder {
    async fn try_respond(
        &self,
        event: &InboundEvent,
        context: &ConversationContext,
    ) -> Result<ResponderOutcome, ResponderError> {
        Ok(ResponderOutcome::responded(self.reply(
            &event.text,
            &event.display_name,
            context,
        )))
    }

    fn tier(&self) -> &str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use responder_core::{default_context_ttl, ContextUpdate, SourceProvider};

    fn context() -> ConversationContext {
        ConversationContext::new("+5511999990000", default_context_ttl())
    }

    fn event(text: &str) -> InboundEvent {
        InboundEvent::new("+5511999990000", text, "Maria", SourceProvider::Evolution)
    }

    #[tokio::test]
    async fn greeting_includes_display_name() {
        let responder = FallbackResponder::new();
        let outcome = responder.try_respond(&event("Olá"), &context()).await.unwrap();

        match outcome {
            ResponderOutcome::Responded { text } => {
                assert!(text.contains("Maria"));
                assert!(text.contains("Bem-vindo"));
            }
            ResponderOutcome::NoAnswer => panic!("fallback must always answer"),
        }
    }

    #[tokio::test]
    async fn returning_customer_is_welcomed_back() {
        let responder = FallbackResponder::new();
        let mut ctx = context();
        ctx.apply(
            ContextUpdate::default().bot_response_count(2),
            default_context_ttl(),
        );

        let outcome = responder.try_respond(&event("oi"), &ctx).await.unwrap();
        match outcome {
            ResponderOutcome::Responded { text } => {
                assert!(text.contains("de volta"));
            }
            ResponderOutcome::NoAnswer => panic!("fallback must always answer"),
        }
    }

    #[test]
    fn faq_keywords_answer_directly() {
        let responder = FallbackResponder::new();
        let ctx = context();

        assert!(responder
            .reply("qual o horario de funcionamento?", "Maria", &ctx)
            .contains("Segunda a Sexta"));
        assert!(responder
            .reply("me passa o telefone de vocês", "Maria", &ctx)
            .contains("contatos"));
        assert!(responder
            .reply("quanto é o valor?", "Maria", &ctx)
            .contains("preços"));
    }

    #[test]
    fn thanks_gets_a_closing_reply() {
        let responder = FallbackResponder::new();
        let reply = responder.reply("obrigado!", "Maria", &context());
        assert!(reply.contains("Por nada"));
    }

    #[test]
    fn rotating_default_varies_with_turn_count() {
        let responder = FallbackResponder::new();
        let mut replies = Vec::new();
        for count in 0..3u32 {
            let mut ctx = context();
            ctx.apply(
                ContextUpdate::default().bot_response_count(count),
                default_context_ttl(),
            );
            replies.push(responder.reply("xyzzy", "Maria", &ctx));
        }
        assert_ne!(replies[0], replies[1]);
        assert_ne!(replies[1], replies[2]);

        // Wraps around after the last variant.
        let mut ctx = context();
        ctx.apply(
            ContextUpdate::default().bot_response_count(3),
            default_context_ttl(),
        );
        assert_eq!(responder.reply("xyzzy", "Maria", &ctx), replies[0]);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let responder = FallbackResponder::new();
        let ctx = context();
        assert_eq!(
            responder.reply("preciso de ajuda com algo", "Maria", &ctx),
            responder.reply("preciso de ajuda com algo", "Maria", &ctx)
        );
    }
}
