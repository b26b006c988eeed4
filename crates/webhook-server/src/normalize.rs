//! Inbound normalizer: provider wire formats → canonical [`InboundEvent`].
//!
//! Every provider collapses to the same shape before the escalation policy
//! runs. Malformed payloads are dropped with a reason; they never abort the
//! handler for other customers.

use serde::Deserialize;

use responder_core::{InboundEvent, SourceProvider};

/// Names that count as "no name" on the wire.
const PLACEHOLDER_NAMES: &[&str] = &["", "none", "null", "cliente"];

/// Default a blank or placeholder display name to `Cliente <last 4 digits>`.
pub fn fallback_display_name(raw: Option<&str>, number: &str) -> String {
    if let Some(name) = raw {
        let trimmed = name.trim();
        if !PLACEHOLDER_NAMES.contains(&trimmed.to_lowercase().as_str()) {
            return trimmed.to_string();
        }
    }

    let digits: Vec<char> = number.chars().collect();
    if digits.len() >= 4 {
        let last: String = digits[digits.len() - 4..].iter().collect();
        format!("Cliente {last}")
    } else if !number.is_empty() {
        format!("Cliente {number}")
    } else {
        "Cliente Desconhecido".to_string()
    }
}

/// Whether a customer key passes the configured allow-list.
/// An empty allow-list means everyone is allowed.
pub fn is_authorized(customer_key: &str, allowlist: &[String]) -> bool {
    allowlist.is_empty() || allowlist.iter().any(|n| n == customer_key)
}

/// Twilio form-encoded webhook payload.
#[derive(Debug, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "ProfileName", default)]
    pub profile_name: Option<String>,
}

/// Normalize a Twilio form payload.
pub fn from_twilio(form: TwilioForm) -> Result<InboundEvent, &'static str> {
    let number = form.from.replace("whatsapp:", "");
    if number.is_empty() || form.body.is_empty() {
        return Err("missing sender or body");
    }

    let display_name = fallback_display_name(form.profile_name.as_deref(), &number);
    Ok(InboundEvent::new(
        number,
        form.body,
        display_name,
        SourceProvider::Twilio,
    ))
}

/// Evolution API webhook payload.
#[derive(Debug, Deserialize)]
pub struct EvolutionWebhook {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub data: Option<EvolutionData>,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionData {
    #[serde(default)]
    pub key: Option<EvolutionKey>,
    #[serde(default)]
    pub message: Option<EvolutionMessage>,
    #[serde(rename = "pushName", default)]
    pub push_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionKey {
    #[serde(rename = "remoteJid", default)]
    pub remote_jid: String,
    #[serde(rename = "fromMe", default)]
    pub from_me: bool,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionMessage {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(rename = "extendedTextMessage", default)]
    pub extended_text_message: Option<EvolutionExtendedText>,
}

#[derive(Debug, Deserialize)]
pub struct EvolutionExtendedText {
    #[serde(default)]
    pub text: Option<String>,
}

/// Normalize an Evolution webhook payload.
pub fn from_evolution(webhook: EvolutionWebhook) -> Result<InboundEvent, &'static str> {
    if webhook.event.as_deref() != Some("messages.upsert") {
        return Err("unsupported event");
    }

    let data = webhook.data.ok_or("missing data")?;
    let key = data.key.ok_or("missing message key")?;
    if key.from_me {
        return Err("message from us");
    }

    let number = key.remote_jid.replace("@s.whatsapp.net", "");
    if number.is_empty() {
        return Err("missing sender");
    }

    let text = data
        .message
        .and_then(|m| {
            m.conversation
                .or_else(|| m.extended_text_message.and_then(|e| e.text))
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err("no text content");
    }

    let display_name = fallback_display_name(data.push_name.as_deref(), &number);
    Ok(InboundEvent::new(
        number,
        text,
        display_name,
        SourceProvider::Evolution,
    ))
}

/// WAHA webhook payload.
#[derive(Debug, Deserialize)]
pub struct WahaWebhook {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub payload: Option<WahaPayload>,
}

#[derive(Debug, Deserialize)]
pub struct WahaPayload {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "notifyName", default)]
    pub notify_name: Option<String>,
    #[serde(rename = "fromMe", default)]
    pub from_me: bool,
}

/// Normalize a WAHA webhook payload.
pub fn from_waha(webhook: WahaWebhook) -> Result<InboundEvent, &'static str> {
    if webhook.event.as_deref() != Some("message") {
        return Err("unsupported event");
    }

    let payload = webhook.payload.ok_or("missing payload")?;
    if payload.from_me {
        return Err("message from us");
    }

    let number = payload.from.replace("@c.us", "");
    if number.is_empty() {
        return Err("missing sender");
    }

    let text = payload.body.unwrap_or_default();
    if text.is_empty() {
        return Err("no text content");
    }

    let display_name = fallback_display_name(payload.notify_name.as_deref(), &number);
    Ok(InboundEvent::new(
        number,
        text,
        display_name,
        SourceProvider::Waha,
    ))
}

/// n8n workflow webhook payload.
#[derive(Debug, Deserialize)]
pub struct N8nWebhook {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// Normalize an n8n webhook payload.
pub fn from_n8n(webhook: N8nWebhook) -> Result<InboundEvent, &'static str> {
    let number = webhook.from.replace("whatsapp:", "");
    if number.is_empty() || webhook.message.is_empty() {
        return Err("missing sender or message");
    }

    let display_name = fallback_display_name(webhook.profile_name.as_deref(), &number);
    Ok(InboundEvent::new(
        number,
        webhook.message,
        display_name,
        SourceProvider::N8n,
    ))
}
