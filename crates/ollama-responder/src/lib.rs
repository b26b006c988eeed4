//! Secondary responder tier backed by a local Ollama instance.
//!
//! Used when the primary LLM tier passes or fails. Same best-effort
//! posture: any transport problem or unusable reply degrades to
//! "no answer" and the chain falls through.

mod responder;

pub use responder::{OllamaConfig, OllamaResponder};
