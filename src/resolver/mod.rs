//! SNS resolution orchestrator
//!
//! Every lookup goes cache check, then provider race, then result caching.
//! A cached value, negative entries included, answers without touching any
//! provider. A race that produces nothing is a definitive miss and is cached
//! negatively so the same key does not hit providers again within the TTL.
//!
//! - `race` - parallel and sequential race policies
//! - `batch` - bounded-concurrency batch runner
//! - `inflight` - per-key guard that collapses concurrent identical lookups

pub mod batch;
pub mod inflight;
pub mod race;


pub use batch::BatchRunner;
pub use inflight::InflightRegistry;
pub use race::{RaceOutcome, RacePolicy};

use crate::apis::client::{HttpClient, Requester, RetryPolicy};
use crate::apis::manager::ProviderSet;
use crate::apis::stats::{ProviderStats, StatsTracker};
use crate::apis::types::LookupQuery;
use crate::cache::keys::{addr_key, name_key};
use crate::cache::{CacheMetrics, Clock, ResolverCache, SweepReport, SystemClock};
use crate::config::ResolverConfig;
use crate::errors::{ResolverError, ResolverResult};
use crate::logger::{self, LogTag};
use crate::sns::DomainName;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Multi-provider SNS resolver
///
/// Cheap to clone; clones share the cache, providers and stats.
#[derive(Clone)]
pub struct SnsResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    config: ResolverConfig,
    policy: RacePolicy,
    cache: ResolverCache,
    providers: ProviderSet,
    stats: Arc<StatsTracker>,
    inflight: InflightRegistry,
}

impl SnsResolver {
    /// Build the HTTP stack, the provider set and the cache described by `config`
    ///
    /// A durable cache that cannot be opened degrades to in-process caching.
    pub async fn new(config: ResolverConfig) -> ResolverResult<Self> {
        config.validate()?;

        let stats = Arc::new(StatsTracker::new());
        let http = HttpClient::new(config.request_timeout())?;
        let policy = RetryPolicy::new(
            config.max_retries,
            config.retry_base_delay(),
            config.retry_jitter_ratio,
        );
        let requester = Arc::new(Requester::new(http, policy, stats.clone()));
        let providers = ProviderSet::from_config(&config, requester)?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let path = config.sqlite_path().map(str::to_string);
        let capacity = config.memory_cache_capacity;
        let open_clock = clock.clone();
        let cache = tokio::task::spawn_blocking(move || {
            ResolverCache::open(path.as_deref(), capacity, open_clock)
        })
        .await
        .unwrap_or_else(|e| {
            logger::warning(
                LogTag::Cache,
                &format!(
                    "Cache initialization task failed ({}), using in-process cache only",
                    e
                ),
            );
            ResolverCache::memory_only(capacity, clock)
        });

        Ok(Self::from_parts(config, providers, cache, stats))
    }

    /// Assemble a resolver from already-built parts
    pub fn from_parts(
        config: ResolverConfig,
        providers: ProviderSet,
        cache: ResolverCache,
        stats: Arc<StatsTracker>,
    ) -> Self {
        for key in providers.keys() {
            stats.register(&key);
        }

        let policy = RacePolicy::from_parallel_flag(config.parallel_fallbacks);
        logger::info(
            LogTag::Resolver,
            &format!(
                "SNS resolver ready: {} providers, {:?} races, persistent cache: {}",
                providers.len(),
                policy,
                cache.is_persistent()
            ),
        );

        Self {
            inner: Arc::new(ResolverInner {
                config,
                policy,
                cache,
                providers,
                stats,
                inflight: InflightRegistry::new(),
            }),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    pub fn provider_keys(&self) -> Vec<String> {
        self.inner.providers.keys()
    }

    /// Domain -> owner address. `Ok(None)` when no provider knows the name.
    pub async fn resolve_name(&self, domain: &str) -> ResolverResult<Option<String>> {
        let domain = DomainName::parse(domain)?;
        let key = name_key(domain.as_str(), self.inner.config.cache_key_max_len);
        self.lookup(LookupQuery::Name(domain.as_str().to_string()), key)
            .await
    }

    /// Address -> primary domain. `Ok(None)` when the address has none.
    pub async fn reverse_lookup(&self, address: &str) -> ResolverResult<Option<String>> {
        let address = validate_address(address)?;
        let key = addr_key(&address, self.inner.config.cache_key_max_len);
        self.lookup(LookupQuery::Address(address), key).await
    }

    /// Resolve many domains; failures become `None` for that domain only
    ///
    /// Keys are the inputs as given. `concurrency` falls back to the
    /// configured batch concurrency.
    pub async fn batch_resolve_names<I, S>(
        &self,
        domains: I,
        concurrency: Option<usize>,
    ) -> HashMap<String, Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runner = self.batch_runner(concurrency);
        let resolver = self.clone();
        runner
            .run(
                "batch_resolve_names",
                domains.into_iter().map(Into::into).collect(),
                move |domain: String| {
                    let resolver = resolver.clone();
                    async move { resolver.resolve_name(&domain).await }
                },
            )
            .await
    }

    pub async fn batch_reverse_lookup<I, S>(
        &self,
        addresses: I,
        concurrency: Option<usize>,
    ) -> HashMap<String, Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runner = self.batch_runner(concurrency);
        let resolver = self.clone();
        runner
            .run(
                "batch_reverse_lookup",
                addresses.into_iter().map(Into::into).collect(),
                move |address: String| {
                    let resolver = resolver.clone();
                    async move { resolver.reverse_lookup(&address).await }
                },
            )
            .await
    }

    /// Per-provider counters; providers without calls report no rates
    pub fn get_api_stats(&self) -> BTreeMap<String, ProviderStats> {
        let snapshot = self.inner.stats.snapshot();
        logger::debug(
            LogTag::Stats,
            &format!(
                "Stats snapshot: {} providers, {} calls",
                snapshot.len(),
                snapshot.values().map(|s| s.calls).sum::<u64>()
            ),
        );
        snapshot
    }

    /// Probe every provider concurrently
    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        let providers = self.inner.providers.all();
        let probes = providers.iter().map(|provider| async move {
            (provider.key().to_string(), provider.health_check().await)
        });

        let results: BTreeMap<String, bool> = futures::future::join_all(probes)
            .await
            .into_iter()
            .collect();

        let healthy = results.values().filter(|ok| **ok).count();
        logger::info(
            LogTag::Resolver,
            &format!("Health check: {}/{} providers reachable", healthy, results.len()),
        );
        results
    }

    pub async fn sweep_expired_cache(&self) -> SweepReport {
        self.inner.cache.sweep_expired().await
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.inner.cache.metrics()
    }

    /// Release this handle. The last handle also releases the resources:
    /// the provider set (HTTP client, rate limiters) and both cache tiers.
    /// Returns whether this was the last handle.
    pub async fn close(self) -> bool {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => {
                let ResolverInner {
                    providers, cache, ..
                } = inner;
                let provider_count = providers.len();
                drop(providers);
                let released = cache.close().await;
                logger::info(
                    LogTag::System,
                    &format!(
                        "Closed SNS resolver: {} providers, {} cached entries released",
                        provider_count, released
                    ),
                );
                true
            }
            Err(inner) => {
                logger::debug(
                    LogTag::Resolver,
                    &format!(
                        "Resolver handle closed, {} clones still open",
                        Arc::strong_count(&inner) - 1
                    ),
                );
                false
            }
        }
    }

    fn batch_runner(&self, concurrency: Option<usize>) -> BatchRunner {
        BatchRunner::new(concurrency.unwrap_or(self.inner.config.batch_concurrency))
    }

    async fn lookup(&self, query: LookupQuery, key: String) -> ResolverResult<Option<String>> {
        let inner = &self.inner;

        if let Some(cached) = inner.cache.get(&key).await {
            return Ok(cached.into_option());
        }

        let providers = inner.providers.for_direction(query.direction());
        if providers.is_empty() {
            logger::debug(
                LogTag::Resolver,
                &format!("No providers configured for {}", query.direction()),
            );
            return Ok(None);
        }

        let _guard = if inner.config.dedupe_inflight {
            let guard = inner.inflight.acquire(&key).await;
            // a lookup we waited on may have filled the cache
            if let Some(cached) = inner.cache.get(&key).await {
                return Ok(cached.into_option());
            }
            Some(guard)
        } else {
            None
        };

        match race::run_race(inner.policy, &providers, &query).await {
            RaceOutcome::Winner { provider, value } => {
                logger::debug(
                    LogTag::Resolver,
                    &format!("{} -> {} (via {})", query.value(), value, provider),
                );
                inner
                    .cache
                    .set(&key, &value, inner.config.cache_ttl())
                    .await;
                Ok(Some(value))
            }
            RaceOutcome::Miss { not_found, failed } => {
                logger::debug(
                    LogTag::Resolver,
                    &format!(
                        "{} unresolved (not found: {}, failed: {}), caching negative",
                        query.value(),
                        not_found,
                        failed
                    ),
                );
                inner
                    .cache
                    .set_negative(&key, inner.config.negative_cache_ttl())
                    .await;
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for SnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsResolver")
            .field("providers", &self.inner.providers.keys())
            .field("policy", &self.inner.policy)
            .field("cache", &self.inner.cache)
            .finish()
    }
}

/// Trimmed base-58 address that decodes to 32 bytes
fn validate_address(address: &str) -> ResolverResult<String> {
    let trimmed = address.trim();
    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| ResolverError::InvalidAddress(format!("{}: {}", trimmed, e)))?;

    if bytes.len() != 32 {
        return Err(ResolverError::InvalidAddress(format!(
            "{} decodes to {} bytes, expected 32",
            trimmed,
            bytes.len()
        )));
    }

    Ok(trimmed.to_string())
}
