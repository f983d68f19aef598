/// Provider race policies
///
/// Parallel: every adapter runs at once, the first non-empty value wins and
/// the remaining calls are dropped (cancelled) on return. Sequential: adapters
/// run one at a time in priority order until one produces a value.
/// Adapter errors are non-wins in both policies.
use crate::apis::types::{LookupQuery, ProviderAdapter};
use crate::logger::{self, LogTag};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePolicy {
    Parallel,
    Sequential,
}

impl RacePolicy {
    pub fn from_parallel_flag(parallel: bool) -> Self {
        if parallel {
            RacePolicy::Parallel
        } else {
            RacePolicy::Sequential
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome {
    Winner { provider: String, value: String },
    /// No adapter produced a value
    Miss { not_found: usize, failed: usize },
}

pub async fn run_race(
    policy: RacePolicy,
    providers: &[Arc<dyn ProviderAdapter>],
    query: &LookupQuery,
) -> RaceOutcome {
    match policy {
        RacePolicy::Parallel => race_parallel(providers, query).await,
        RacePolicy::Sequential => race_sequential(providers, query).await,
    }
}

async fn race_parallel(providers: &[Arc<dyn ProviderAdapter>], query: &LookupQuery) -> RaceOutcome {
    let mut pending: FuturesUnordered<_> = providers
        .iter()
        .map(|provider| {
            let provider = provider.clone();
            async move {
                let result = provider.lookup(query).await;
                (provider, result)
            }
        })
        .collect();

    let mut not_found = 0;
    let mut failed = 0;

    while let Some((provider, result)) = pending.next().await {
        match result {
            Ok(Some(value)) if !value.is_empty() => {
                logger::debug(
                    LogTag::Resolver,
                    &format!(
                        "{} won race for {} ({} still pending, cancelled)",
                        provider.key(),
                        query.value(),
                        pending.len()
                    ),
                );
                return RaceOutcome::Winner {
                    provider: provider.key().to_string(),
                    value,
                };
            }
            Ok(_) => not_found += 1,
            Err(e) => {
                failed += 1;
                logger::debug(
                    LogTag::Resolver,
                    &format!("{} lost race for {}: {}", provider.key(), query.value(), e),
                );
            }
        }
    }

    RaceOutcome::Miss { not_found, failed }
}

async fn race_sequential(providers: &[Arc<dyn ProviderAdapter>], query: &LookupQuery) -> RaceOutcome {
    let mut not_found = 0;
    let mut failed = 0;

    for provider in providers {
        match provider.lookup(query).await {
            Ok(Some(value)) if !value.is_empty() => {
                logger::debug(
                    LogTag::Resolver,
                    &format!("{} answered {}", provider.key(), query.value()),
                );
                return RaceOutcome::Winner {
                    provider: provider.key().to_string(),
                    value,
                };
            }
            Ok(_) => not_found += 1,
            Err(e) => {
                failed += 1;
                logger::debug(
                    LogTag::Resolver,
                    &format!("{} failed for {}: {}", provider.key(), query.value(), e),
                );
            }
        }
    }

    RaceOutcome::Miss { not_found, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::types::LookupDirection;
    use crate::errors::{ResolverError, ResolverResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct Scripted {
        key: &'static str,
        delay: Duration,
        answer: Result<Option<&'static str>, ()>,
        calls: AtomicUsize,
        finished: AtomicBool,
    }

    impl Scripted {
        fn new(key: &'static str, delay_ms: u64, answer: Result<Option<&'static str>, ()>) -> Arc<Self> {
            Arc::new(Self {
                key,
                delay: Duration::from_millis(delay_ms),
                answer,
                calls: AtomicUsize::new(0),
                finished: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for Scripted {
        fn key(&self) -> &str {
            self.key
        }
        fn supports(&self, direction: LookupDirection) -> bool {
            direction == LookupDirection::Reverse
        }
        async fn reverse_lookup(&self, _address: &str) -> ResolverResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            match self.answer {
                Ok(value) => Ok(value.map(str::to_string)),
                Err(()) => Err(ResolverError::transient(self.key, "HTTP 500")),
            }
        }
        async fn health_check(&self) -> bool {
            true
        }
    }

    fn query() -> LookupQuery {
        LookupQuery::Address("Wallet111".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_first_value_wins_and_cancels_rest() {
        let fast_fail = Scripted::new("a", 10, Err(()));
        let winner = Scripted::new("b", 50, Ok(Some("winner.sol")));
        let slow = Scripted::new("c", 500, Ok(Some("slow.sol")));
        let providers: Vec<Arc<dyn ProviderAdapter>> =
            vec![fast_fail.clone(), winner.clone(), slow.clone()];

        let outcome = run_race(RacePolicy::Parallel, &providers, &query()).await;

        assert_eq!(
            outcome,
            RaceOutcome::Winner {
                provider: "b".to_string(),
                value: "winner.sol".to_string()
            }
        );
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!slow.finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_all_fail_is_miss() {
        let providers: Vec<Arc<dyn ProviderAdapter>> = vec![
            Scripted::new("a", 10, Err(())),
            Scripted::new("b", 20, Ok(None)),
            Scripted::new("c", 30, Ok(Some(""))),
        ];

        let outcome = run_race(RacePolicy::Parallel, &providers, &query()).await;
        assert_eq!(outcome, RaceOutcome::Miss { not_found: 2, failed: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_stops_at_first_value() {
        let first = Scripted::new("a", 10, Err(()));
        let second = Scripted::new("b", 10, Ok(Some("b.sol")));
        let third = Scripted::new("c", 1, Ok(Some("c.sol")));
        let providers: Vec<Arc<dyn ProviderAdapter>> =
            vec![first.clone(), second.clone(), third.clone()];

        let outcome = run_race(RacePolicy::Sequential, &providers, &query()).await;

        assert_eq!(
            outcome,
            RaceOutcome::Winner {
                provider: "b".to_string(),
                value: "b.sol".to_string()
            }
        );
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_providers_is_miss() {
        let outcome = run_race(RacePolicy::Parallel, &[], &query()).await;
        assert_eq!(outcome, RaceOutcome::Miss { not_found: 0, failed: 0 });
    }
}
