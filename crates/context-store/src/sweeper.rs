//! Periodic reaping of expired contexts.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::ContextStore;

/// Spawn a background task that sweeps expired contexts on a fixed interval.
///
/// The sweep runs on its own timer, independent of message handling, and
/// never holds a per-key lock: eviction happens inside the store's own
/// short-lived write lock.
pub fn spawn(store: Arc<dyn ContextStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired().await;
            if removed > 0 {
                info!(removed, "reaped expired conversation contexts");
            } else {
                debug!("context sweep found nothing to reap");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContextStore;
    use responder_core::ContextUpdate;

    #[tokio::test]
    async fn sweeper_reaps_expired_entries() {
        let store = Arc::new(MemoryContextStore::with_ttl(chrono::Duration::zero()));
        store.update("+5511999990000", ContextUpdate::default()).await;

        let handle = spawn(store.clone() as Arc<dyn ContextStore>, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(store.live_count().await, 0);
        assert_eq!(store.sweep_expired().await, 0);
    }
}
