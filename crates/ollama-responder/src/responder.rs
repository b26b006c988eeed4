//! OllamaResponder implementation.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use responder_core::{
    implies_handoff, ConversationContext, InboundEvent, Responder, ResponderError,
    ResponderOutcome,
};

/// Replies at or below this length are treated as unusable noise.
const MIN_REPLY_CHARS: usize = 10;

/// Configuration for [`OllamaResponder`].
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl OllamaConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `OLLAMA_URL` | Ollama server URL | `http://localhost:11434` |
    /// | `OLLAMA_MODEL` | Model name | `mistral` |
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "mistral".to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Secondary responder tier over the Ollama generate API.
pub struct OllamaResponder {
    client: Client,
    config: OllamaConfig,
}

impl OllamaResponder {
    /// Create a new responder with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, ResponderError> {
        let client = Client::builder().build().map_err(|e| {
            ResponderError::Configuration(format!("failed to create HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Create a responder from environment variables.
    pub fn from_env() -> Result<Self, ResponderError> {
        Self::new(OllamaConfig::from_env())
    }

    /// Build the Portuguese context prompt for the local model.
    fn prompt(&self, event: &InboundEvent, context: &ConversationContext) -> String {
        format!(
            "Contexto: Atendimento ao cliente em português brasileiro\n\
             Cliente: {name}\n\
             Estágio da conversa: {stage}\n\
             Respostas do bot anteriores: {count}\n\n\
             Mensagem do cliente: {text}\n\n\
             Responda de forma útil e concisa em português.",
            name = event.display_name,
            stage = context.stage,
            count = context.bot_response_count,
            text = event.text,
        )
    }
}

#[async_trait]
impl Responder for OllamaResponder {
    async fn try_respond(
        &self,
        event: &InboundEvent,
        context: &ConversationContext,
    ) -> Result<ResponderOutcome, ResponderError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: self.prompt(event, context),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResponderError::Transport(format!(
                "ollama returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::InvalidReply(e.to_string()))?;

        let text = body.response.trim().to_string();
        if text.chars().count() <= MIN_REPLY_CHARS {
            debug!(customer = %event.customer_key, "ollama reply too short, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }
        if implies_handoff(&text) {
            debug!(customer = %event.customer_key, "ollama reply implied a handoff, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }

        Ok(ResponderOutcome::Responded { text })
    }

    fn tier(&self) -> &str {
        "secondary-llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use responder_core::{default_context_ttl, SourceProvider};

    #[test]
    fn default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "mistral");
    }

    #[test]
    fn prompt_embeds_customer_and_stage() {
        let responder = OllamaResponder::new(OllamaConfig::default()).unwrap();
        let event = InboundEvent::new(
            "+5511999990000",
            "qual o horário?",
            "Maria",
            SourceProvider::Waha,
        );
        let context = ConversationContext::new("+5511999990000", default_context_ttl());

        let prompt = responder.prompt(&event, &context);
        assert!(prompt.contains("Cliente: Maria"));
        assert!(prompt.contains("greeting"));
        assert!(prompt.contains("qual o horário?"));
    }

    #[test]
    fn tier_name() {
        let responder = OllamaResponder::new(OllamaConfig::default()).unwrap();
        assert_eq!(responder.tier(), "secondary-llm");
    }

    #[test]
    fn generate_response_tolerates_missing_field() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(body.response.is_empty());
    }
}
