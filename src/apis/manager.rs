/// Provider set - builds every enabled, credentialed adapter from configuration
///
/// Each adapter gets its own rate limiter. All of them share one Requester
/// (and so one HTTP client and one StatsTracker). The set is owned by a single
/// resolver instance; nothing here is process-wide.
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::errors::ResolverResult;
use crate::logger::{self, LogTag};

use super::client::Requester;
use super::helius::HeliusClient;
use super::ledger::{LedgerClient, HELIUS_RPC_PROVIDER, LEDGER_PROVIDER};
use super::rate_limiter::RateLimiter;
use super::shyft::ShyftClient;
use super::solanafm::SolanaFmClient;
use super::types::{LookupDirection, ProviderAdapter};

/// Adapters in priority order (the order the sequential policy tries them)
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderSet {
    pub fn from_adapters(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { providers }
    }

    /// Fails only on a rate-limit period that cannot become a `Duration`
    pub fn from_config(config: &ResolverConfig, requester: Arc<Requester>) -> ResolverResult<Self> {
        let capacity = config.rate_limit.capacity;
        let period = config.rate_limit_period()?;
        let limiter = |key: &str| RateLimiter::new(key, capacity, period);
        let health_timeout = config.health_check_timeout();
        let endpoints = &config.endpoints;

        let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

        // Forward: authenticated RPC first, then the public ledger endpoint
        if let Some(key) = config.helius_key() {
            providers.push(Arc::new(LedgerClient::new(
                HELIUS_RPC_PROVIDER,
                super::helius::with_api_key(&endpoints.helius_rpc_url, key),
                requester.clone(),
                limiter(HELIUS_RPC_PROVIDER),
                health_timeout,
            )));
        }
        if config.ledger_enabled {
            providers.push(Arc::new(LedgerClient::new(
                LEDGER_PROVIDER,
                endpoints.solana_rpc_url.clone(),
                requester.clone(),
                limiter(LEDGER_PROVIDER),
                health_timeout,
            )));
        }

        // Reverse
        if let Some(key) = config.helius_key() {
            providers.push(Arc::new(HeliusClient::new(
                &endpoints.helius_rpc_url,
                key,
                requester.clone(),
                limiter(super::helius::HELIUS_PROVIDER),
                health_timeout,
            )));
        }
        if let Some(key) = config.shyft_key() {
            providers.push(Arc::new(ShyftClient::new(
                &endpoints.shyft_base_url,
                key,
                requester.clone(),
                limiter(super::shyft::SHYFT_PROVIDER),
                health_timeout,
            )));
        }
        if config.solanafm_enabled {
            providers.push(Arc::new(SolanaFmClient::new(
                &endpoints.solanafm_base_url,
                requester.clone(),
                limiter(super::solanafm::SOLANAFM_PROVIDER),
                health_timeout,
            )));
        }

        let set = Self { providers };
        logger::info(
            LogTag::Api,
            &format!(
                "Providers: forward=[{}] reverse=[{}]",
                set.keys_for(LookupDirection::Forward).join(", "),
                set.keys_for(LookupDirection::Reverse).join(", ")
            ),
        );
        Ok(set)
    }

    pub fn all(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.providers
    }

    pub fn for_direction(&self, direction: LookupDirection) -> Vec<Arc<dyn ProviderAdapter>> {
        self.providers
            .iter()
            .filter(|p| p.supports(direction))
            .cloned()
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.key().to_string()).collect()
    }

    pub fn keys_for(&self, direction: LookupDirection) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.supports(direction))
            .map(|p| p.key().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::client::{HttpClient, RetryPolicy};
    use crate::apis::stats::StatsTracker;
    use std::time::Duration;

    fn requester() -> Arc<Requester> {
        Arc::new(Requester::new(
            HttpClient::new(Duration::from_secs(1)).unwrap(),
            RetryPolicy::default(),
            Arc::new(StatsTracker::new()),
        ))
    }

    #[test]
    fn test_default_config_providers() {
        let set = ProviderSet::from_config(&ResolverConfig::default(), requester()).unwrap();
        assert_eq!(set.keys_for(LookupDirection::Forward), vec!["ledger"]);
        assert_eq!(set.keys_for(LookupDirection::Reverse), vec!["solanafm"]);
    }

    #[test]
    fn test_credentials_enable_providers_in_priority_order() {
        let config = ResolverConfig {
            helius_api_key: Some("h".to_string()),
            shyft_api_key: Some("s".to_string()),
            ..Default::default()
        };
        let set = ProviderSet::from_config(&config, requester()).unwrap();

        assert_eq!(
            set.keys_for(LookupDirection::Forward),
            vec!["helius-rpc", "ledger"]
        );
        assert_eq!(
            set.keys_for(LookupDirection::Reverse),
            vec!["helius", "shyft", "solanafm"]
        );
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_infinite_period_is_a_config_error() {
        let mut config = ResolverConfig::default();
        config.rate_limit.period_secs = f64::INFINITY;
        assert!(matches!(
            ProviderSet::from_config(&config, requester()),
            Err(crate::errors::ResolverError::Config(_))
        ));
    }

    #[test]
    fn test_everything_disabled() {
        let config = ResolverConfig {
            solanafm_enabled: false,
            ledger_enabled: false,
            ..Default::default()
        };
        let set = ProviderSet::from_config(&config, requester()).unwrap();
        assert!(set.is_empty());
        assert!(set.for_direction(LookupDirection::Reverse).is_empty());
    }
}
