//! NluResponder implementation.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use responder_core::{
    implies_handoff, ConversationContext, InboundEvent, Responder, ResponderError,
    ResponderOutcome,
};

/// Configuration for [`NluResponder`].
#[derive(Debug, Clone)]
pub struct NluConfig {
    /// Full webhook URL of the NLU service.
    pub webhook_url: String,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            webhook_url: "http://localhost:5005/webhooks/rest/webhook".to_string(),
        }
    }
}

impl NluConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `NLU_URL` | NLU webhook URL | `http://localhost:5005/webhooks/rest/webhook` |
    pub fn from_env() -> Self {
        Self {
            webhook_url: env::var("NLU_URL")
                .unwrap_or_else(|_| "http://localhost:5005/webhooks/rest/webhook".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct NluRequest<'a> {
    sender: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct NluReply {
    #[serde(default)]
    text: Option<String>,
}

/// NLU responder tier over a Rasa-style REST webhook.
pub struct NluResponder {
    client: Client,
    config: NluConfig,
}

impl NluResponder {
    /// Create a new responder with the given configuration.
    pub fn new(config: NluConfig) -> Result<Self, ResponderError> {
        let client = Client::builder().build().map_err(|e| {
            ResponderError::Configuration(format!("failed to create HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Create a responder from environment variables.
    pub fn from_env() -> Result<Self, ResponderError> {
        Self::new(NluConfig::from_env())
    }
}

#[async_trait]
impl Responder for NluResponder {
    async fn try_respond(
        &self,
        event: &InboundEvent,
        _context: &ConversationContext,
    ) -> Result<ResponderOutcome, ResponderError> {
        let request = NluRequest {
            sender: &event.customer_key,
            message: &event.text,
        };

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResponderError::Transport(format!(
                "NLU webhook returned {}",
                response.status()
            )));
        }

        let replies: Vec<NluReply> = response
            .json()
            .await
            .map_err(|e| ResponderError::InvalidReply(e.to_string()))?;

        let text = replies
            .into_iter()
            .find_map(|r| r.text)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            debug!(customer = %event.customer_key, "NLU had no reply, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }
        if implies_handoff(&text) {
            debug!(customer = %event.customer_key, "NLU reply implied a handoff, passing");
            return Ok(ResponderOutcome::NoAnswer);
        }

        Ok(ResponderOutcome::Responded { text })
    }

    fn tier(&self) -> &str {
        "nlu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_rasa() {
        let config = NluConfig::default();
        assert_eq!(config.webhook_url, "http://localhost:5005/webhooks/rest/webhook");
    }

    #[test]
    fn reply_parsing_takes_first_text() {
        let replies: Vec<NluReply> =
            serde_json::from_str(r#"[{"text": "Nosso horário é 8h às 18h."}, {"text": "outro"}]"#)
                .unwrap();
        let text = replies.into_iter().find_map(|r| r.text).unwrap();
        assert_eq!(text, "Nosso horário é 8h às 18h.");
    }

    #[test]
    fn reply_parsing_tolerates_missing_text() {
        let replies: Vec<NluReply> = serde_json::from_str(r#"[{"image": "x.png"}]"#).unwrap();
        assert!(replies.into_iter().find_map(|r| r.text).is_none());
    }

    #[test]
    fn tier_name() {
        let responder = NluResponder::new(NluConfig::default()).unwrap();
        assert_eq!(responder.tier(), "nlu");
    }
}
