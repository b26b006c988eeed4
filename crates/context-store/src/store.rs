//! The context store interface and its in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use responder_core::{default_context_ttl, ContextUpdate, ConversationContext};

/// Keyed, TTL-bound conversational state per customer.
///
/// Implementations must never hand out an entry across its expiry boundary:
/// a read after `expires_at` is a miss that produces a fresh default.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Get the context for a customer key, creating a fresh default when the
    /// entry is absent or expired.
    async fn get(&self, key: &str) -> ConversationContext;

    /// Merge an update into the context for a key (creating it first when
    /// absent or expired) and return the merged result. Always bumps
    /// `last_updated` and `expires_at`.
    async fn update(&self, key: &str, update: ContextUpdate) -> ConversationContext;

    /// Drop the context for a key, if any.
    async fn clear(&self, key: &str);

    /// Delete every entry whose `expires_at` has passed; returns how many
    /// were removed. Safe to call concurrently with `get`/`update`.
    async fn sweep_expired(&self) -> usize;
}

/// In-memory [`ContextStore`] behind an async `RwLock`.
pub struct MemoryContextStore {
    entries: RwLock<HashMap<String, ConversationContext>>,
    ttl: Duration,
}

impl MemoryContextStore {
    /// Create a store with the default two-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(default_context_ttl())
    }

    /// Create a store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live (unexpired) entries.
    pub async fn live_count(&self) -> usize {
        let now = Utc::now();
        let entries = self.entries.read().await;
        entries.values().filter(|c| !c.is_expired_at(now)).count()
    }
}

impl Default for MemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn get(&self, key: &str) -> ConversationContext {
        {
            let entries = self.entries.read().await;
            if let Some(context) = entries.get(key) {
                if !context.is_expired() {
                    return context.clone();
                }
            }
        }

        // Miss or expired entry: start over from a fresh default.
        let fresh = ConversationContext::new(key, self.ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), fresh.clone());
        debug!(customer = %key, "created fresh conversation context");
        fresh
    }

    async fn update(&self, key: &str, update: ContextUpdate) -> ConversationContext {
        let mut entries = self.entries.write().await;
        let context = match entries.get(key) {
            Some(existing) if !existing.is_expired() => existing.clone(),
            _ => ConversationContext::new(key, self.ttl),
        };
        let mut merged = context;
        merged.apply(update, self.ttl);
        entries.insert(key.to_string(), merged.clone());
        merged
    }

    async fn clear(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, context| !context.is_expired_at(now));
        before - entries.len()
    }
}
