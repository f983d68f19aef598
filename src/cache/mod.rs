//! Two-tier lookup cache
//!
//! Reads check the in-process tier, then the durable tier. A live durable hit
//! is promoted into memory; an expired durable hit is deleted and reported
//! as a miss. Writes go to both tiers. Durable failures are logged and
//! degrade to a miss or a no-op, they never reach the caller.
//!
//! Values are plain strings. The empty string is the negative sentinel:
//! "looked up before, resolved to nothing".

pub mod clock;
pub mod durable;
pub mod keys;
pub mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use durable::{DurableStore, NullStore, SqliteStore, StoredEntry};
pub use memory::{MemoryLookup, MemoryTier};

use crate::logger::{self, LogTag};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Stored value meaning "no result"
pub const NEGATIVE_SENTINEL: &str = "";

/// A cache answer as seen by the resolver
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Found(String),
    /// Previously resolved to nothing
    Negative,
}

impl CachedValue {
    pub fn from_stored(value: String) -> Self {
        if value == NEGATIVE_SENTINEL {
            CachedValue::Negative
        } else {
            CachedValue::Found(value)
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            CachedValue::Found(value) => Some(value),
            CachedValue::Negative => None,
        }
    }
}

/// Cache counters for monitoring
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheMetrics {
    pub memory_hits: u64,
    pub durable_hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub writes: u64,
    pub evictions: u64,
    pub durable_errors: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> Option<f64> {
        let hits = self.memory_hits + self.durable_hits;
        let total = hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(hits as f64 / total as f64)
        }
    }
}

#[derive(Debug, Default)]
struct MetricCounters {
    memory_hits: AtomicU64,
    durable_hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    writes: AtomicU64,
    evictions: AtomicU64,
    durable_errors: AtomicU64,
}

/// Outcome of a maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub memory_removed: usize,
    pub durable_removed: usize,
}

pub struct ResolverCache {
    memory: MemoryTier,
    durable: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    counters: MetricCounters,
}

impl ResolverCache {
    pub fn new(memory_capacity: usize, durable: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: MemoryTier::new(memory_capacity),
            durable,
            clock,
            counters: MetricCounters::default(),
        }
    }

    /// In-process tier only
    pub fn memory_only(memory_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self::new(memory_capacity, Arc::new(NullStore), clock)
    }

    /// Open the SQLite tier at `path`, degrading to memory-only when it is
    /// absent or cannot be opened
    pub fn open(path: Option<&str>, memory_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let Some(path) = path else {
            logger::info(LogTag::Cache, "Durable cache disabled, using in-process cache only");
            return Self::memory_only(memory_capacity, clock);
        };

        match SqliteStore::open(path) {
            Ok(store) => {
                logger::info(LogTag::Cache, &format!("Initialized SQLite cache at {}", path));
                Self::new(memory_capacity, Arc::new(store), clock)
            }
            Err(e) => {
                logger::warning(
                    LogTag::Cache,
                    &format!(
                        "SQLite cache at {} unavailable ({}), using in-process cache only",
                        path, e
                    ),
                );
                Self::memory_only(memory_capacity, clock)
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.durable.is_persistent()
    }

    pub async fn get(&self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now_unix();

        match self.memory.get(key, now) {
            MemoryLookup::Hit(value) => {
                self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
                return Some(CachedValue::from_stored(value));
            }
            MemoryLookup::Expired => {
                self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            }
            MemoryLookup::Missing => {}
        }

        let stored = match self.durable.load(key).await {
            Ok(stored) => stored,
            Err(e) => {
                self.record_durable_error("read", key, &e.to_string());
                None
            }
        };

        match stored {
            Some(entry) if entry.expires_at > now => {
                self.counters.durable_hits.fetch_add(1, Ordering::Relaxed);
                let evicted =
                    self.memory
                        .insert(key.to_string(), entry.value.clone(), entry.expires_at, now);
                self.counters
                    .evictions
                    .fetch_add(evicted as u64, Ordering::Relaxed);
                Some(CachedValue::from_stored(entry.value))
            }
            Some(_) => {
                self.counters.expirations.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = self.durable.remove(key).await {
                    self.record_durable_error("delete", key, &e.to_string());
                }
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Write-through to both tiers
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let now = self.clock.now_unix();
        let expires_at = now.saturating_add(ttl.as_secs() as i64);

        let evicted = self
            .memory
            .insert(key.to_string(), value.to_string(), expires_at, now);
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        self.counters
            .evictions
            .fetch_add(evicted as u64, Ordering::Relaxed);

        let entry = StoredEntry {
            value: value.to_string(),
            expires_at,
        };
        if let Err(e) = self.durable.store(key, &entry).await {
            self.record_durable_error("write", key, &e.to_string());
        }
    }

    /// Record a definitive miss
    pub async fn set_negative(&self, key: &str, ttl: Duration) {
        self.set(key, NEGATIVE_SENTINEL, ttl).await;
    }

    /// Drop every expired entry from both tiers
    pub async fn sweep_expired(&self) -> SweepReport {
        let now = self.clock.now_unix();
        let memory_removed = self.memory.purge_expired(now);

        let durable_removed = match self.durable.purge_expired(now).await {
            Ok(count) => count,
            Err(e) => {
                self.record_durable_error("sweep", "*", &e.to_string());
                0
            }
        };

        if memory_removed + durable_removed > 0 {
            logger::debug(
                LogTag::Cache,
                &format!(
                    "Swept expired entries: memory={} durable={}",
                    memory_removed, durable_removed
                ),
            );
        }

        SweepReport {
            memory_removed,
            durable_removed,
        }
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            durable_hits: self.counters.durable_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            durable_errors: self.counters.durable_errors.load(Ordering::Relaxed),
        }
    }

    pub fn memory_len(&self) -> usize {
        self.memory.entry_count()
    }

    /// Drop both tiers, returns how many in-process entries were released.
    /// The durable store is dropped on a blocking thread: closing pooled
    /// SQLite connections checkpoints the WAL.
    pub async fn close(self) -> usize {
        let released = self.memory.entry_count();
        let name = self.durable.name();
        let durable = self.durable;

        if let Err(e) = tokio::task::spawn_blocking(move || drop(durable)).await {
            logger::warning(LogTag::Cache, &format!("Closing {} cache failed: {}", name, e));
        }
        released
    }

    fn record_durable_error(&self, operation: &str, key: &str, error: &str) {
        self.counters.durable_errors.fetch_add(1, Ordering::Relaxed);
        logger::warning(
            LogTag::Cache,
            &format!(
                "{} cache {} failed for key={}: {}",
                self.durable.name(),
                operation,
                key,
                error
            ),
        );
    }
}

impl std::fmt::Debug for ResolverCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverCache")
            .field("durable", &self.durable.name())
            .field("memory_entries", &self.memory.entry_count())
            .finish()
    }
}
