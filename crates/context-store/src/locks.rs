//! Per-customer-key mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Key-sharded async locks serializing read-modify-write per customer.
///
/// Calls for different customer keys proceed fully in parallel; calls for
/// the same key queue on one mutex, so increments and escalation-flag merges
/// are never lost. This is deliberately not a global lock.
#[derive(Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a customer key, creating it on first use.
    ///
    /// The guard is owned, so it can be held across awaits while the
    /// turn for that customer runs.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.inner.lock().await;
            Arc::clone(table.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether no keys are tracked yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());
        let counter = Arc::new(Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("+5511999990000").await;
                let value = { *counter.lock().await };
                tokio::time::sleep(Duration::from_millis(1)).await;
                *counter.lock().await = value + 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Without per-key serialization the read-sleep-write would lose updates.
        assert_eq!(*counter.lock().await, 8);
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = KeyedLocks::new();
        let guard_a = locks.acquire("+5511111111111").await;
        // Acquiring a different key must not block while A is held.
        let guard_b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire("+5522222222222"),
        )
        .await
        .expect("distinct keys should never contend");
        drop(guard_a);
        drop(guard_b);
        assert_eq!(locks.len().await, 2);
    }
}
