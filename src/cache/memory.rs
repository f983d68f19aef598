/// In-process cache tier with absolute expiry and bounded size
///
/// Expired entries are deleted when read (lazy deletion) and in bulk by
/// `purge_expired`. When full, inserting a new key first drops expired
/// entries, then evicts the entry closest to expiry.
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: i64,
}

impl MemoryEntry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug)]
pub struct MemoryTier {
    data: Mutex<HashMap<String, MemoryEntry>>,
    capacity: usize,
}

/// Result of a memory-tier read
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryLookup {
    Hit(String),
    Expired,
    Missing,
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str, now: i64) -> MemoryLookup {
        let mut data = self.data.lock();

        match data.get(key) {
            Some(entry) if entry.is_expired(now) => {
                data.remove(key);
                MemoryLookup::Expired
            }
            Some(entry) => MemoryLookup::Hit(entry.value.clone()),
            None => MemoryLookup::Missing,
        }
    }

    /// Insert or replace, returns how many entries were evicted to make room
    pub fn insert(&self, key: String, value: String, expires_at: i64, now: i64) -> usize {
        let mut data = self.data.lock();
        let mut evicted = 0;

        if data.len() >= self.capacity && !data.contains_key(&key) {
            let before = data.len();
            data.retain(|_, entry| !entry.is_expired(now));
            evicted += before - data.len();

            if data.len() >= self.capacity {
                let soonest = data
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(soonest) = soonest {
                    data.remove(&soonest);
                    evicted += 1;
                }
            }
        }

        data.insert(key, MemoryEntry { value, expires_at });
        evicted
    }

    pub fn purge_expired(&self, now: i64) -> usize {
        let mut data = self.data.lock();
        let before = data.len();
        data.retain(|_, entry| !entry.is_expired(now));
        before - data.len()
    }

    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }
}
