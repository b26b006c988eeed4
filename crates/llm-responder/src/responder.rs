//! LlmResponder implementation over a chat-completions API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use responder_core::{
    implies_handoff, ConversationContext, InboundEvent, Responder, ResponderError,
    ResponderOutcome,
};

use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::LlmConfig;

/// Replies at or below this length are treated as unusable noise.
const MIN_REPLY_CHARS: usize = 10;

/// Primary responder tier backed by an OpenAI-compatible chat API.
pub struct LlmResponder {
    client: Client,
    config: LlmConfig,
}

impl LlmResponder {
    /// Create a new responder with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, ResponderError> {
        let client = Client::builder().build().map_err(|e| {
            ResponderError::Configuration(format!("failed to create HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Create a responder from environment variables.
    ///
    /// See [`LlmConfig::from_env`] for the variables involved.
    pub fn from_env() -> Result<Self, ResponderError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Build the system prompt with conversational context baked in.
    fn system_prompt(&self, event: &InboundEvent, context: &ConversationContext) -> String {
        if let Some(ref prompt) = self.config.system_prompt {
            return prompt.clone();
        }

        format!(
            "You are a helpful customer service assistant for a Brazilian company.\n\n\
             Customer name: {name}\n\
             Conversation context: {stage} stage\n\
             Previous bot responses: {count}\n\n\
             Instructions:\n\
             - Respond in Portuguese (Brazilian)\n\
             - Be friendly, helpful, and professional\n\
             - Keep responses concise (under 150 words)\n\
             - Handle common business questions: hours, contact info, pricing, services\n\
             - Use appropriate emojis sparingly",
            name = event.display_name,
            stage = context.stage,
            count = context.bot_response_count,
        )
    }

    /// Build the user prompt, prefixed with the last exchange when one exists.
    fn user_prompt(&self, event: &InboundEvent, context: &ConversationContext) -> String {
        let mut prompt = String::new();
        if context.bot_response_count > 0 {
            if let (Some(user), Some(bot)) =
                (&context.last_user_message, &context.last_bot_response)
            {
                prompt.push_str(&format!(
                    "Recent context: Customer said '{user}' and we responded '{bot}'\n\n"
                ));
            }
        }
        prompt.push_str(&format!("Current customer message: {}", event.text));
        prompt
    }

    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, ResponderError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResponderError::Transport(format!(
                "chat API returned {status}: {body}"
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ResponderError::InvalidReply(e.to_string()))
    }
}

#[async_trait]
impl Responder for LlmResponder {
    async fn try_respond(
        &self,
        event: &InboundEvent,
        context: &ConversationContext,
    ) -> Result<ResponderOutcome, ResponderError> {
        if self.config.api_key.is_empty() {
            return Err(ResponderError::Configuration("no API key configured".into()));
        }

        let messages = vec![
            ChatMessage::system(self.system_prompt(event, context)),
            ChatMessage::user(self.user_prompt(event, context)),
        ];

        let response = self.chat_completion(messages).await?;
        let text = match response.first_text() {
            Some(text) => text.trim().to_string(),
            None => {
                warn!(customer = %event.customer_key, "chat API returned no choices");
                return Ok(ResponderOutcome::NoAnswer);
            }
        };

        if text.chars().count() <= MIN_REPLY_CHARS {
            debug!(customer = %event.customer_key, "reply too short, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }

        if implies_handoff(&text) {
            debug!(customer = %event.customer_key, "reply implied a handoff, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }

        Ok(ResponderOutcome::Responded { text })
    }

    fn tier(&self) -> &str {
        "llm"
    }

    async fn is_ready(&self) -> bool {
        !self.config.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use responder_core::{default_context_ttl, ContextUpdate, SourceProvider};

    fn responder() -> LlmResponder {
        LlmResponder::new(LlmConfig::builder().api_key("test-key").build()).unwrap()
    }

    fn event(text: &str) -> InboundEvent {
        InboundEvent::new("+5511999990000", text, "Maria", SourceProvider::Twilio)
    }

    #[test]
    fn system_prompt_embeds_context() {
        let responder = responder();
        let mut context = ConversationContext::new("+5511999990000", default_context_ttl());
        context.apply(
            ContextUpdate::default().bot_response_count(2),
            default_context_ttl(),
        );

        let prompt = responder.system_prompt(&event("oi"), &context);
        assert!(prompt.contains("Maria"));
        assert!(prompt.contains("Previous bot responses: 2"));
    }

    #[test]
    fn system_prompt_override_wins() {
        let responder = LlmResponder::new(
            LlmConfig::builder()
                .api_key("test-key")
                .system_prompt("Prompt customizado.")
                .build(),
        )
        .unwrap();
        let context = ConversationContext::new("+5511999990000", default_context_ttl());

        assert_eq!(
            responder.system_prompt(&event("oi"), &context),
            "Prompt customizado."
        );
    }

    #[test]
    fn user_prompt_includes_last_exchange() {
        let responder = responder();
        let mut context = ConversationContext::new("+5511999990000", default_context_ttl());
        context.apply(
            ContextUpdate::default()
                .bot_response_count(1)
                .exchange("qual o preço?", "Os preços variam."),
            default_context_ttl(),
        );

        let prompt = responder.user_prompt(&event("e o prazo?"), &context);
        assert!(prompt.contains("qual o preço?"));
        assert!(prompt.contains("Os preços variam."));
        assert!(prompt.contains("Current customer message: e o prazo?"));
    }

    #[test]
    fn first_turn_prompt_has_no_history() {
        let responder = responder();
        let context = ConversationContext::new("+5511999990000", default_context_ttl());

        let prompt = responder.user_prompt(&event("oi"), &context);
        assert!(!prompt.contains("Recent context"));
    }

    #[tokio::test]
    async fn missing_api_key_is_a_configuration_error() {
        let responder = LlmResponder::new(LlmConfig::default()).unwrap();
        let context = ConversationContext::new("+5511999990000", default_context_ttl());

        let result = responder.try_respond(&event("oi"), &context).await;
        assert!(matches!(result, Err(ResponderError::Configuration(_))));
        assert!(!responder.is_ready().await);
    }
}
