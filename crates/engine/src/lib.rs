//! Conversation routing and escalation engine.
//!
//! This crate decides, per inbound customer message, whether the automated
//! responder chain answers or a human agent takes over, and owns the gates
//! that sit in front of any automated send.
//!
//! # Architecture
//!
//! ```text
//! InboundEvent (from a provider webhook, already normalized)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         ENGINE                              │
//! │                                                             │
//! │  1. Acquire the per-customer lock                           │
//! │         ↓                                                   │
//! │  2. Load context from the store (fresh if expired)          │
//! │         ↓                                                   │
//! │  3. Escalation policy (pure, fixed priority order)          │
//! │     • match → persist flags, produce escalation notice      │
//! │         ↓                                                   │
//! │  4. Responder chain, tier by tier under hard timeouts       │
//! │     • first usable reply wins                               │
//! │     • every tier dry → escalate anyway                      │
//! │         ↓                                                   │
//! │  5. Persist turn into the context store                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outbound gate ([`gate`]) and the human-like send delay are applied by
//! the caller around the engine: gates before the turn runs, the delay right
//! before dispatch. Agent-authored replies bypass both.

mod chain;
mod config;
mod engine;
mod error;
pub mod escalation;
pub mod gate;
pub mod notices;
mod sender;
pub mod stage;

pub use chain::{ChainReply, ResponderChain};
pub use config::EngineConfig;
pub use engine::{Engine, EngineDecision};
pub use error::EngineError;
pub use escalation::{EscalationPolicy, EscalationReason};
pub use gate::{BusinessHours, GateDecision, HumanDelay, OutboundGate};
pub use sender::{LoggingSender, MessageSender, NoOpSender};

// Re-export commonly used types from dependencies
pub use context_store::{ContextStore, KeyedLocks, MemoryContextStore};
pub use responder_core::{InboundEvent, Responder, ResponderOutcome};
