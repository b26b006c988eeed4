//! TTL-bound conversational context storage.
//!
//! This crate owns the per-customer context lifecycle:
//!
//! - [`ContextStore`] - the injected store interface (no module-level
//!   singletons; ownership and lifecycle stay visible and testable)
//! - [`MemoryContextStore`] - in-memory implementation behind an async lock
//! - [`KeyedLocks`] - per-customer-key mutual exclusion for read-modify-write
//! - [`sweeper`] - periodic reaping of expired entries
//!
//! An expired entry is logically absent: `get` never returns a context past
//! its `expires_at`, it hands back a fresh default instead.

mod locks;
mod store;
pub mod sweeper;

pub use locks::KeyedLocks;
pub use store::{ContextStore, MemoryContextStore};
