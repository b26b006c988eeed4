//! Transport error types.

use thiserror::Error;

/// Errors that can occur while talking to a WhatsApp gateway.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Client construction or configuration failed.
    #[error("transport configuration error: {0}")]
    Configuration(String),

    /// The HTTP request failed outright.
    #[error("transport request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected send: {status}: {body}")]
    Rejected { status: u16, body: String },
}
