/// In-flight lookup registry
///
/// Concurrent lookups for the same cache key queue behind one guard. The
/// holder runs the provider round and fills the cache; each follower then
/// re-checks the cache before doing any work of its own.
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub struct InflightRegistry {
    slots: Mutex<HashMap<String, Slot>>,
}

pub struct InflightGuard<'a> {
    registry: &'a InflightRegistry,
    key: String,
    slot: Slot,
    _lock: OwnedMutexGuard<()>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive ownership of `key`
    pub async fn acquire(&self, key: &str) -> InflightGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(key.to_string()).or_default().clone()
        };

        let lock = slot.clone().lock_owned().await;

        InflightGuard {
            registry: self,
            key: key.to_string(),
            slot,
            _lock: lock,
        }
    }

    /// Keys with a holder or waiters
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.registry.slots.lock();
        // map + this guard's handle + the lock's handle; anything more is a waiter
        if Arc::strong_count(&self.slot) <= 3 {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_same_key_is_serialized() {
        let registry = Arc::new(InflightRegistry::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let registry = registry.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            handles.push(tokio::spawn(async move {
                let _guard = registry.acquire("name:a.sol").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let registry = InflightRegistry::new();
        let _a = registry.acquire("name:a.sol").await;
        let _b = registry.acquire("name:b.sol").await;
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_slot_released_after_drop() {
        let registry = InflightRegistry::new();
        {
            let _guard = registry.acquire("addr:x").await;
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }
}
