//! Per-provider call statistics
//!
//! Counters only grow. Rates and means are derived when a snapshot is taken.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct ProviderCounters {
    calls: AtomicU64,
    successes: AtomicU64,
    total_latency_us: AtomicU64,
}

/// Point-in-time view of one provider's counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStats {
    pub calls: u64,
    pub successes: u64,
    /// `None` until the first call is recorded
    pub success_rate: Option<f64>,
    pub mean_latency_ms: Option<f64>,
}

impl ProviderStats {
    pub fn failures(&self) -> u64 {
        self.calls - self.successes
    }

    pub fn has_data(&self) -> bool {
        self.calls > 0
    }
}

#[derive(Debug, Default)]
pub struct StatsTracker {
    providers: RwLock<HashMap<String, Arc<ProviderCounters>>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a provider visible in snapshots before its first call
    pub fn register(&self, provider: &str) {
        self.counters(provider);
    }

    pub fn record(&self, provider: &str, success: bool, latency: Duration) {
        let counters = self.counters(provider);
        counters.calls.fetch_add(1, Ordering::Relaxed);
        if success {
            counters.successes.fetch_add(1, Ordering::Relaxed);
        }
        counters
            .total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BTreeMap<String, ProviderStats> {
        let providers = self.providers.read();
        providers
            .iter()
            .map(|(key, counters)| (key.clone(), Self::summarize(counters)))
            .collect()
    }

    pub fn provider(&self, provider: &str) -> Option<ProviderStats> {
        let providers = self.providers.read();
        providers.get(provider).map(|c| Self::summarize(c))
    }

    fn counters(&self, provider: &str) -> Arc<ProviderCounters> {
        if let Some(existing) = self.providers.read().get(provider) {
            return existing.clone();
        }
        self.providers
            .write()
            .entry(provider.to_string())
            .or_default()
            .clone()
    }

    fn summarize(counters: &ProviderCounters) -> ProviderStats {
        let calls = counters.calls.load(Ordering::Relaxed);
        let successes = counters.successes.load(Ordering::Relaxed);
        let total_latency_us = counters.total_latency_us.load(Ordering::Relaxed);

        let (success_rate, mean_latency_ms) = if calls == 0 {
            (None, None)
        } else {
            (
                Some(successes as f64 / calls as f64),
                Some(total_latency_us as f64 / calls as f64 / 1000.0),
            )
        };

        ProviderStats {
            calls,
            successes,
            success_rate,
            mean_latency_ms,
        }
    }
}
