//! Permanent fallback tier for the responder chain.
//!
//! This crate provides [`FallbackResponder`], a pure rule-based tier with no
//! external I/O. It terminates the chain: as long as it is installed, the
//! chain always returns something. Responses are selected by simple keyword
//! match (greeting, hours, pricing, contact) with a rotating default keyed by
//! the customer's turn count so repeated unresolved turns see varied phrasing.

mod responder;

pub use responder::FallbackResponder;

// Re-export core types for convenience
pub use responder_core::{Responder, ResponderError, ResponderOutcome};
