//! Message sender trait and test implementations.

use async_trait::async_trait;

use crate::error::EngineError;

/// Trait for sending outbound texts to a customer.
///
/// Abstracted to support different WhatsApp gateways (Evolution, WAHA) and
/// tests. Failures are logged by the caller and never retried here; the
/// recorded conversation state stands regardless of delivery.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message.
    ///
    /// # Arguments
    /// * `recipient` - Customer key (phone number)
    /// * `text` - Message content
    async fn send_text(&self, recipient: &str, text: &str) -> Result<(), EngineError>;
}

/// A no-op message sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl MessageSender for NoOpSender {
    async fn send_text(&self, _recipient: &str, _text: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A logging message sender for debugging that logs all sends.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl MessageSender for LoggingSender {
    async fn send_text(&self, recipient: &str, text: &str) -> Result<(), EngineError> {
        tracing::info!(recipient = %recipient, "Sending message: {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_sender_accepts_everything() {
        let sender = NoOpSender;
        sender.send_text("+5511999990000", "test").await.unwrap();
    }

    #[tokio::test]
    async fn logging_sender_accepts_everything() {
        let sender = LoggingSender;
        sender.send_text("+5511999990000", "test").await.unwrap();
    }
}
