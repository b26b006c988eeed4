//! Error types for responder tier operations.

use thiserror::Error;

/// Errors that can occur while a responder tier produces a reply.
///
/// The chain treats every variant the same way as [`ResponderOutcome::NoAnswer`]:
/// it falls through to the next tier and never surfaces the failure to the
/// customer.
///
/// [`ResponderOutcome::NoAnswer`]: crate::ResponderOutcome::NoAnswer
#[derive(Debug, Error)]
pub enum ResponderError {
    /// The tier is misconfigured (missing key, bad URL).
    #[error("responder configuration error: {0}")]
    Configuration(String),

    /// The backing service could not be reached or returned a transport error.
    #[error("responder transport error: {0}")]
    Transport(String),

    /// The backing service answered with something unusable.
    #[error("invalid responder reply: {0}")]
    InvalidReply(String),

    /// The tier is temporarily unavailable.
    #[error("responder unavailable: {0}")]
    Unavailable(String),
}
