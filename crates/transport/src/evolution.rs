//! Evolution API client.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use engine::{EngineError, MessageSender};

use crate::error::TransportError;

/// Configuration for the Evolution API gateway.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Base URL of the Evolution API server.
    pub base_url: String,
    /// API key sent in the `apikey` header.
    pub api_key: String,
    /// Instance name registered with the server.
    pub instance: String,
}

impl EvolutionConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `EVOLUTION_API_URL` | Server URL | `http://localhost:8080` |
    /// | `EVOLUTION_API_KEY` | API key | empty |
    /// | `EVOLUTION_INSTANCE_NAME` | Instance name | `default` |
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("EVOLUTION_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            api_key: env::var("EVOLUTION_API_KEY").unwrap_or_default(),
            instance: env::var("EVOLUTION_INSTANCE_NAME").unwrap_or_else(|_| "default".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    number: &'a str,
    text: &'a str,
}

/// Client for sending texts through an Evolution API instance.
#[derive(Clone)]
pub struct EvolutionClient {
    client: Client,
    config: EvolutionConfig,
}

impl EvolutionClient {
    /// Create a client with the given configuration.
    pub fn new(config: EvolutionConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(EvolutionConfig::from_env())
    }

    /// Send a text message to a phone number.
    pub async fn send_text_message(&self, to_number: &str, text: &str) -> Result<(), TransportError> {
        let url = format!(
            "{}/message/sendText/{}",
            self.config.base_url, self.config.instance
        );

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&SendTextRequest {
                number: to_number,
                text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(recipient = %to_number, "sent message via Evolution API");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for EvolutionClient {
    async fn send_text(&self, recipient: &str, text: &str) -> Result<(), EngineError> {
        self.send_text_message(recipient, text)
            .await
            .map_err(|e| EngineError::SendFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_defaults() {
        // Only checks the fallback values; env overrides are deployment concerns.
        let config = EvolutionConfig {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            instance: "default".to_string(),
        };
        let client = EvolutionClient::new(config).unwrap();
        assert_eq!(client.config.instance, "default");
    }

    #[test]
    fn send_request_serializes_number_and_text() {
        let request = SendTextRequest {
            number: "+5511999990000",
            text: "Olá!",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"number\":\"+5511999990000\""));
        assert!(json.contains("\"text\":\"Olá!\""));
    }
}
