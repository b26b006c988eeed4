//! Outbound WhatsApp gateway clients.
//!
//! Provider-agnostic sending behind [`engine::MessageSender`]: the engine
//! hands over `(customer_key, text)` and a gateway client delivers it.
//! Send failures are logged by the caller and never retried here; recorded
//! conversation state is never rolled back because a send failed.

mod error;
mod evolution;
mod waha;

pub use error::TransportError;
pub use evolution::{EvolutionClient, EvolutionConfig};
pub use waha::{WahaClient, WahaConfig};
