//! Core trait and types for responder tier implementations.
//!
//! This crate provides the shared interface for all responder tiers
//! in the Atende service desk. It defines:
//!
//! - [`Responder`] - The trait every responder tier implements
//! - [`ResponderOutcome`] - Sum type for tier results: an answer or a pass
//! - [`InboundEvent`] - The provider-neutral inbound customer message
//! - [`ConversationContext`] / [`ContextUpdate`] - Per-customer conversational
//!   state and its merge contract
//! - [`ResponderError`] - Error types for tier operations
//!
//! # Example
//!
//! ```rust
//! use responder_core::{
//!     ConversationContext, InboundEvent, Responder, ResponderError, ResponderOutcome,
//! };
//! use async_trait::async_trait;
//!
//! struct MyResponder;
//!
//! #[async_trait]
//! impl Responder for MyResponder {
//!     async fn try_respond(
//!         &self,
//!         event: &InboundEvent,
//!         _context: &ConversationContext,
//!     ) -> Result<ResponderOutcome, ResponderError> {
//!         Ok(ResponderOutcome::responded(format!("Olá, {}!", event.display_name)))
//!     }
//!
//!     fn tier(&self) -> &str {
//!         "my-tier"
//!     }
//! }
//! ```

mod context;
mod error;
mod event;
mod filter;
mod trait_def;

pub use context::{
    default_context_ttl, ContextUpdate, ConversationContext, ConversationStage,
    DEFAULT_CONTEXT_TTL_SECS,
};
pub use error::ResponderError;
pub use event::{InboundEvent, SourceProvider};
pub use filter::implies_handoff;
pub use trait_def::{Responder, ResponderOutcome};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
