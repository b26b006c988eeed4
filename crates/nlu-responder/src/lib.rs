//! NLU responder tier over a Rasa-style REST webhook.
//!
//! Third tier in the chain: a trained NLU service answering from intents.
//! Best-effort like the other remote tiers; anything unusable becomes
//! "no answer" and the chain falls through to the permanent fallback.

mod responder;

pub use responder::{NluConfig, NluResponder};
