//! Primary LLM responder tier.
//!
//! Calls an OpenAI-compatible chat-completions API to answer customer
//! messages in Brazilian Portuguese. The tier is strictly best-effort:
//! transport errors, short replies and replies that imply a handoff all
//! surface as "no answer" so the chain falls through to the next tier.

mod api_types;
mod config;
mod responder;

pub use config::{LlmConfig, LlmConfigBuilder, DEFAULT_PROMPT_FILE};
pub use responder::LlmResponder;
