//! WAHA (WhatsApp HTTP API) client.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use engine::{EngineError, MessageSender};

use crate::error::TransportError;

/// Configuration for the WAHA gateway.
#[derive(Debug, Clone)]
pub struct WahaConfig {
    /// Base URL of the WAHA server.
    pub base_url: String,
    /// API key sent in the `X-Api-Key` header.
    pub api_key: String,
    /// Session name.
    pub session: String,
}

impl WahaConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WAHA_API_URL` | Server URL | `http://localhost:3000` |
    /// | `WAHA_API_KEY` | API key | empty |
    /// | `WAHA_SESSION_NAME` | Session name | `default` |
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("WAHA_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            api_key: env::var("WAHA_API_KEY").unwrap_or_default(),
            session: env::var("WAHA_SESSION_NAME").unwrap_or_else(|_| "default".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTextRequest<'a> {
    session: &'a str,
    chat_id: String,
    text: &'a str,
}

/// Turn a phone number into a WAHA chat ID (`<digits>@c.us`).
fn chat_id_for(number: &str) -> String {
    let digits: String = number.chars().filter(|c| !matches!(c, '+' | ' ')).collect();
    if digits.ends_with("@c.us") {
        digits
    } else {
        format!("{digits}@c.us")
    }
}

/// Client for sending texts through a WAHA server.
#[derive(Clone)]
pub struct WahaClient {
    client: Client,
    config: WahaConfig,
}

impl WahaClient {
    /// Create a client with the given configuration.
    pub fn new(config: WahaConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(WahaConfig::from_env())
    }

    /// Send a text message to a phone number.
    pub async fn send_text_message(&self, to_number: &str, text: &str) -> Result<(), TransportError> {
        let url = format!("{}/api/sendText", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.config.api_key)
            .json(&SendTextRequest {
                session: &self.config.session,
                chat_id: chat_id_for(to_number),
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

        info!(recipient = %to_number, "sent message via WAHA");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for WahaClient {
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
    fn chat_id_strips_plus_and_spaces() {
        assert_eq!(chat_id_for("+55 11 99999 0000"), "5511999990000@c.us");
        assert_eq!(chat_id_for("5511999990000"), "5511999990000@c.us");
    }

    #[test]
    fn chat_id_is_idempotent() {
        assert_eq!(chat_id_for("5511999990000@c.us"), "5511999990000@c.us");
    }

    #[test]
    fn send_request_uses_waha_field_names() {
        let request = SendTextRequest {
            session: "default",
            chat_id: chat_id_for("+5511999990000"),
            text: "Olá!",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"chatId\""));
        assert!(json.contains("\"session\":\"default\""));
    }
}
