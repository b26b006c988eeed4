//! Inbound event types shared by the normalizer, the engine and the tiers.

use serde::{Deserialize, Serialize};

/// The messaging provider an inbound event arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceProvider {
    /// Twilio WhatsApp webhook (form-encoded).
    Twilio,
    /// Evolution API webhook (JSON).
    Evolution,
    /// WAHA webhook (JSON).
    Waha,
    /// n8n workflow webhook (JSON).
    N8n,
}

impl SourceProvider {
    /// Stable identifier used in logs and stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::Evolution => "evolution",
            Self::Waha => "waha",
            Self::N8n => "n8n",
        }
    }
}

impl std::fmt::Display for SourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-neutral inbound customer message.
///
/// Every webhook payload collapses to this shape before it reaches the
/// escalation policy, regardless of the source provider's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Stable identifier for the customer thread (typically a phone number).
    pub customer_key: String,
    /// Message text.
    pub text: String,
    /// Customer display name, already defaulted by the normalizer.
    pub display_name: String,
    /// Which provider produced the event.
    pub source_provider: SourceProvider,
}

impl InboundEvent {
    /// Create a new inbound event.
    pub fn new(
        customer_key: impl Into<String>,
        text: impl Into<String>,
        display_name: impl Into<String>,
        source_provider: SourceProvider,
    ) -> Self {
        Self {
            customer_key: customer_key.into(),
            text: text.into(),
            display_name: display_name.into(),
            source_provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_identifiers_are_stable() {
        assert_eq!(SourceProvider::Twilio.as_str(), "twilio");
        assert_eq!(SourceProvider::Evolution.as_str(), "evolution");
        assert_eq!(SourceProvider::Waha.as_str(), "waha");
        assert_eq!(SourceProvider::N8n.as_str(), "n8n");
    }

    #[test]
    fn event_construction() {
        let event = InboundEvent::new("+5511999990000", "Olá", "Maria", SourceProvider::Evolution);
        assert_eq!(event.customer_key, "+5511999990000");
        assert_eq!(event.display_name, "Maria");
        assert_eq!(event.source_provider, SourceProvider::Evolution);
    }
}
